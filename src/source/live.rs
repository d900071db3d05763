use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{FlightDeskError, Result};
use crate::models::FlightRecord;
use crate::source::FlightSource;

/// IATA location codes for the supported cities.
const CITY_TO_IATA: [(&str, &str); 8] = [
    ("Bangalore", "BLR"),
    ("Delhi", "DEL"),
    ("Mumbai", "BOM"),
    ("Chennai", "MAA"),
    ("Kolkata", "CCU"),
    ("Hyderabad", "HYD"),
    ("Pune", "PNQ"),
    ("Jaipur", "JAI"),
];

/// Carrier code to display name. Unmapped codes render as "<code> Airlines".
const AIRLINE_CODES: [(&str, &str); 12] = [
    ("AI", "Air India"),
    ("SG", "SpiceJet"),
    ("6E", "IndiGo"),
    ("UK", "Vistara"),
    ("G8", "GoAir"),
    ("I5", "AirAsia"),
    ("QP", "Akasa Air"),
    ("9I", "Alliance Air"),
    ("IX", "Air India Express"),
    ("S5", "Star Air"),
    ("ZO", "Zoom Air"),
    ("TR", "TruJet"),
];

fn city_to_iata(city: &str) -> Option<&'static str> {
    CITY_TO_IATA
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(city))
        .map(|(_, code)| *code)
}

fn airline_name(code: &str) -> String {
    AIRLINE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("{code} Airlines"))
}

/// Flight source backed by a live flight-offers API (Amadeus wire shape).
/// One token request plus one search per fetch; no retries.
pub struct LiveOffersSource {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl LiveOffersSource {
    pub fn new(
        api_key: String,
        api_secret: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlightDeskError::Backend(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            api_secret,
            base_url,
        })
    }

    /// OAuth2 client-credentials grant. Credentials go in the form body,
    /// never in the URL.
    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/v1/security/oauth2/token", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FlightDeskError::Backend(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FlightDeskError::Backend(format!(
                "token request returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FlightDeskError::Backend(format!("failed to parse token response: {e}")))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl FlightSource for LiveOffersSource {
    async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
    ) -> Result<Vec<FlightRecord>> {
        // Resolve both codes before touching the network.
        let origin_code = city_to_iata(origin)
            .ok_or_else(|| FlightDeskError::UnsupportedCity(origin.to_string()))?;
        let destination_code = city_to_iata(destination)
            .ok_or_else(|| FlightDeskError::UnsupportedCity(destination.to_string()))?;

        let date = departure_date.format("%Y-%m-%d").to_string();
        tracing::info!(origin_code, destination_code, %date, "searching live flight offers");

        let token = self.access_token().await?;
        let url = format!("{}/v2/shopping/flight-offers", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("originLocationCode", origin_code),
                ("destinationLocationCode", destination_code),
                ("departureDate", date.as_str()),
                ("adults", "1"),
                ("max", "100"),
                ("currencyCode", "INR"),
            ])
            .send()
            .await
            .map_err(|e| FlightDeskError::Backend(format!("offers search failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FlightDeskError::Backend(format!(
                "offers search returned {}",
                response.status()
            )));
        }

        let offers: OffersResponse = response
            .json()
            .await
            .map_err(|e| FlightDeskError::Backend(format!("failed to parse offers: {e}")))?;

        let records = normalize(&offers, origin, destination);
        tracing::info!("returning {} valid flights", records.len());
        Ok(records)
    }
}

/// Flatten offers into canonical records, keeping only the first segment of
/// each itinerary (direct legs). Malformed offers are skipped with a warning.
fn normalize(offers: &OffersResponse, origin: &str, destination: &str) -> Vec<FlightRecord> {
    let mut records = Vec::new();
    for offer in &offers.data {
        for itinerary in &offer.itineraries {
            match record_from_itinerary(itinerary, &offer.price, origin, destination) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("skipping malformed flight offer: {e}");
                }
            }
        }
    }
    records
}

fn record_from_itinerary(
    itinerary: &Itinerary,
    price: &OfferPrice,
    origin: &str,
    destination: &str,
) -> Result<FlightRecord> {
    let segment = itinerary
        .segments
        .first()
        .ok_or_else(|| FlightDeskError::MalformedRecord("itinerary has no segments".to_string()))?;

    let (hours, minutes) = parse_iso_duration(&segment.duration).ok_or_else(|| {
        FlightDeskError::MalformedRecord(format!("bad duration: {}", segment.duration))
    })?;
    let (departure_date, departure_time) = split_timestamp(&segment.departure.at)?;
    let (arrival_date, arrival_time) = split_timestamp(&segment.arrival.at)?;
    let price: f64 = price.total.parse().map_err(|_| {
        FlightDeskError::MalformedRecord(format!("bad price total: {}", price.total))
    })?;

    Ok(FlightRecord {
        flight_number: format!("{}{}", segment.carrier_code, segment.number),
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure_date,
        departure_time,
        arrival_date,
        arrival_time,
        price,
        airline: airline_name(&segment.carrier_code),
        duration: format!("{hours}h {minutes}m"),
        duration_min: hours * 60 + minutes,
    })
}

/// `PT<H>H<M>M` to (hours, minutes), tolerating hours-only and minutes-only.
/// At least one component must be present.
fn parse_iso_duration(s: &str) -> Option<(i64, i64)> {
    let rest = s.strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }
    let (hours, rest) = match rest.split_once('H') {
        Some((h, r)) => (h.parse().ok()?, r),
        None => (0, rest),
    };
    let minutes = match rest.strip_suffix('M') {
        Some(m) => m.parse().ok()?,
        None if rest.is_empty() => 0,
        None => return None,
    };
    Some((hours, minutes))
}

/// `YYYY-MM-DDTHH:MM:SS` into date and time halves.
fn split_timestamp(at: &str) -> Result<(String, String)> {
    at.split_once('T')
        .map(|(d, t)| (d.to_string(), t.to_string()))
        .ok_or_else(|| FlightDeskError::MalformedRecord(format!("bad timestamp: {at}")))
}

// Offers API wire shapes. Only the fields we read.

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<Offer>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    #[serde(default)]
    itineraries: Vec<Itinerary>,
    price: OfferPrice,
}

#[derive(Debug, Deserialize)]
struct OfferPrice {
    total: String,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(rename = "carrierCode")]
    carrier_code: String,
    number: String,
    duration: String,
    departure: SegmentPoint,
    arrival: SegmentPoint,
}

#[derive(Debug, Deserialize)]
struct SegmentPoint {
    at: String,
}
