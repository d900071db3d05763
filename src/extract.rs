use chrono::{Days, NaiveDate};

use crate::error::{FlightDeskError, Result};
use crate::models::{FilterSpec, TimeBucket};

/// The 8 supported cities. Extraction and both backends reject anything else.
pub const CITIES: [&str; 8] = [
    "Bangalore",
    "Delhi",
    "Mumbai",
    "Chennai",
    "Kolkata",
    "Hyderabad",
    "Pune",
    "Jaipur",
];

/// The 6 airlines carried by the static store.
pub const AIRLINES: [&str; 6] = [
    "Air India",
    "SpiceJet",
    "IndiGo",
    "Vistara",
    "GoAir",
    "AirAsia",
];

/// Price-ceiling trigger phrases, longest first so "maximum" wins over "max"
/// and "not more than" over "more than".
const PRICE_KEYWORDS: [&str; 10] = [
    "not more than",
    "no more than",
    "cheaper than",
    "less than",
    "maximum",
    "under",
    "below",
    "within",
    "up to",
    "max",
];

// Disjoint token sets for the three time-of-day buckets.
const MORNING_WORDS: [&str; 3] = ["morning", "early", "forenoon"];
const AFTERNOON_WORDS: [&str; 3] = ["afternoon", "noon", "midday"];
const NIGHT_WORDS: [&str; 4] = ["night", "evening", "tonight", "late"];

/// Parse one free-text query into a `FilterSpec`.
///
/// `today` anchors relative-date keywords; callers pass the current date so
/// the extractor itself stays pure and testable.
pub fn extract(text: &str, today: NaiveDate) -> Result<FilterSpec> {
    let lower = text.to_lowercase();
    let tokens = tokenize(&lower);

    let origin = city_after(&tokens, &["from", "origin"]);
    let destination = city_after(&tokens, &["to", "destination"]);

    if origin.is_none() && destination.is_none() {
        return Err(FlightDeskError::MissingRoute);
    }

    let departure_date = if tokens.iter().any(|t| *t == "tomorrow") {
        today + Days::new(1)
    } else {
        today
    };

    let spec = FilterSpec {
        origin,
        destination,
        departure_date,
        max_price: extract_max_price(&lower),
        time_bucket: extract_time_bucket(&tokens),
        airlines: extract_airlines(&lower),
    };
    tracing::debug!(?spec, "extracted filter spec");
    Ok(spec)
}

fn tokenize(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// First city token that directly follows any of the connector words.
fn city_after(tokens: &[&str], connectors: &[&str]) -> Option<String> {
    for window in tokens.windows(2) {
        if connectors.contains(&window[0]) {
            if let Some(city) = CITIES.iter().find(|c| c.eq_ignore_ascii_case(window[1])) {
                return Some((*city).to_string());
            }
        }
    }
    None
}

/// First numeric literal after the first price keyword, commas stripped.
fn extract_max_price(lower: &str) -> Option<f64> {
    let (kw, pos) = PRICE_KEYWORDS
        .iter()
        .filter_map(|kw| find_word(lower, kw).map(|pos| (kw, pos)))
        .min_by_key(|&(kw, pos)| (pos, std::cmp::Reverse(kw.len())))?;
    first_number(&lower[pos + kw.len()..])
}

/// Position of `word` in `text`, matched only at word boundaries so "under"
/// does not fire inside "thunder".
fn find_word(text: &str, word: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find(word) {
        let begin = start + offset;
        let end = begin + word.len();
        let bounded_left = begin == 0 || !bytes[begin - 1].is_ascii_alphanumeric();
        let bounded_right = end == text.len() || !bytes[end].is_ascii_alphanumeric();
        if bounded_left && bounded_right {
            return Some(begin);
        }
        // Keywords are ASCII, so begin + 1 stays on a char boundary.
        start = begin + 1;
    }
    None
}

fn first_number(text: &str) -> Option<f64> {
    let mut number = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() || (c == '.' && !number.is_empty()) {
            number.push(c);
        } else if c == ',' && !number.is_empty() {
            // Thousands separator inside a literal like 5,000
            continue;
        } else if !number.is_empty() {
            break;
        }
    }
    number.parse().ok()
}

/// Bucket priority when keywords from several buckets appear: morning wins
/// over afternoon wins over night. Deliberate, tested policy.
fn extract_time_bucket(tokens: &[&str]) -> Option<TimeBucket> {
    let has = |words: &[&str]| tokens.iter().any(|t| words.contains(t));
    if has(&MORNING_WORDS) {
        Some(TimeBucket::Morning)
    } else if has(&AFTERNOON_WORDS) {
        Some(TimeBucket::Afternoon)
    } else if has(&NIGHT_WORDS) {
        Some(TimeBucket::Night)
    } else {
        None
    }
}

fn extract_airlines(lower: &str) -> Vec<String> {
    AIRLINES
        .iter()
        .filter(|a| lower.contains(&a.to_lowercase()))
        .map(|a| (*a).to_string())
        .collect()
}
