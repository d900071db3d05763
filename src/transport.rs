use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{FlightDeskError, Result};
use crate::models::{GenerateRequest, GenerateResponse};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Seam to the LLM collaborator. One call per turn, no retries; a failed call
/// becomes an apology for that turn only.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse>;
}

pub struct GeminiTransport {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiTransport {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlightDeskError::Llm(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);

        // API key travels in a header, never in the URL query string.
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| FlightDeskError::Llm(format!("failed to reach Gemini API: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FlightDeskError::Llm(format!(
                "Gemini API returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FlightDeskError::Llm(format!("failed to parse Gemini response: {e}")))
    }
}
