use async_trait::async_trait;
use std::sync::Arc;

use crate::config::GeminiConfig;
use crate::extract::{AIRLINES, CITIES};
use crate::models::{Content, FilterSpec, GenerateRequest, GenerationConfig};
use crate::transport::Transport;

/// Greeting sent by the chat boundary before the first turn.
pub const WELCOME: &str =
    "Hi there! ✈️ Ready to help you find the best flights. How can I assist you today?";

/// Fixed reply when the LLM collaborator fails or returns no candidates.
const LLM_APOLOGY: &str =
    "I'm sorry, I'm having trouble putting together a reply right now. Please try again in a moment.";

/// Builds the final prompt around a rendered flight table and unwraps the
/// collaborator's reply. Never surfaces an error; a failed call becomes a
/// fixed apology for the turn.
#[async_trait]
pub trait Composer: Send + Sync {
    async fn compose(&self, table: &str, spec: &FilterSpec) -> String;

    /// Reply when the backend returned no records at all. Bypasses the LLM
    /// but reads like its output.
    fn no_results_message(&self, spec: &FilterSpec) -> String;
}

pub struct GeminiComposer {
    tx: Arc<dyn Transport>,
    config: GeminiConfig,
}

impl GeminiComposer {
    pub fn new(tx: Arc<dyn Transport>, config: GeminiConfig) -> Self {
        Self { tx, config }
    }

    fn system_instruction(&self) -> String {
        format!(
            "You are a helpful technical flight support assistant. Your role is to assist \
             users in finding flight details in a clear and easy-to-read format. When you \
             are given a flight table, reproduce it verbatim, without changing any value, \
             and wrap it in a short, friendly advisory message. Offer concise and helpful \
             answers to flight-related queries. Available airlines: {}. Available airports: \
             {}. Use these names exactly as written, never changing their casing.",
            AIRLINES.join(", "),
            CITIES.join(", "),
        )
    }

    fn user_prompt(&self, table: &str, spec: &FilterSpec) -> String {
        format!(
            "The user searched for flights from {} to {} on {}.\n\n\
             Here is the result table to reproduce verbatim:\n\n{}",
            spec.origin.as_deref().unwrap_or("anywhere"),
            spec.destination.as_deref().unwrap_or("anywhere"),
            spec.departure_date.format("%Y-%m-%d"),
            table,
        )
    }
}

#[async_trait]
impl Composer for GeminiComposer {
    async fn compose(&self, table: &str, spec: &FilterSpec) -> String {
        let request = GenerateRequest {
            system_instruction: Some(Content::system(self.system_instruction())),
            contents: vec![Content::user(self.user_prompt(table, spec))],
            generation_config: Some(GenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
                stop_sequences: self.config.stop_sequences.clone(),
            }),
        };

        match self.tx.generate(&request).await {
            Ok(response) => match response.first_text() {
                Some(text) => text.to_string(),
                None => {
                    tracing::error!("Gemini returned no candidates");
                    LLM_APOLOGY.to_string()
                }
            },
            Err(e) => {
                tracing::error!("Gemini call failed: {e}");
                LLM_APOLOGY.to_string()
            }
        }
    }

    fn no_results_message(&self, spec: &FilterSpec) -> String {
        format!(
            "I'm sorry, I couldn't find any flights from {} to {} on {}. You could try a \
             different date, or one of our other supported cities: {}.",
            spec.origin.as_deref().unwrap_or("your origin"),
            spec.destination.as_deref().unwrap_or("your destination"),
            spec.departure_date.format("%Y-%m-%d"),
            CITIES.join(", "),
        )
    }
}
