use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical flight leg, regardless of which backend produced it.
///
/// Field names mirror the static store's column names so a row deserializes
/// without a mapping layer. Invariant: `duration_min` always equals
/// `h * 60 + m` for the `"{h}h {m}m"` string in `duration`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlightRecord {
    #[serde(rename = "FlightNumber")]
    pub flight_number: String,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "DepartureDate")]
    pub departure_date: String,
    #[serde(rename = "DepartureTime")]
    pub departure_time: String,
    #[serde(rename = "ArrivalDate")]
    pub arrival_date: String,
    #[serde(rename = "ArrivalTime")]
    pub arrival_time: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Airline")]
    pub airline: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Duration_min")]
    pub duration_min: i64,
}

/// Time-of-day partition of the departure hour. The three buckets are
/// half-open and cover [0, 24) exactly.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Night,
}

impl TimeBucket {
    pub fn contains_hour(&self, hour: u32) -> bool {
        match self {
            TimeBucket::Morning => hour < 12,
            TimeBucket::Afternoon => (12..17).contains(&hour),
            TimeBucket::Night => (17..24).contains(&hour),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Night => "night",
        }
    }
}

/// Structured predicates extracted from one free-text query. Built fresh per
/// turn, never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FilterSpec {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: NaiveDate,
    pub max_price: Option<f64>,
    pub time_bucket: Option<TimeBucket>,
    pub airlines: Vec<String>,
}

/// Query against the static store. Every dimension is optional; an absent
/// dimension is left out of the predicate entirely, not wildcarded.
#[derive(Debug, Clone, Default)]
pub struct FlightQuery {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub departure_dates: Vec<String>,
    pub arrival_dates: Vec<String>,
    pub airlines: Vec<String>,
    /// Inclusive [low, high] price bound.
    pub price: Option<(f64, f64)>,
    /// Inclusive [low, high] bound on duration in minutes.
    pub duration_min: Option<(i64, i64)>,
}

// Gemini generateContent wire format.

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: i32,
    pub top_p: f32,
    pub max_output_tokens: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateResponse {
    /// Text of the first candidate's first part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
    }
}

// Chat boundary types.

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
