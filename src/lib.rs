pub mod compose;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod models;
pub mod source;
pub mod transport;
pub mod turn;

use std::sync::Arc;

use crate::compose::GeminiComposer;
use crate::config::Config;
use crate::error::Result;
use crate::transport::{GeminiTransport, Transport};
use crate::turn::{TurnEngine, TurnOutcome};

/// Facade over the whole pipeline: one instance serves many concurrent
/// turns, each with its own turn-local state.
pub struct FlightDeskService {
    turns: TurnEngine,
}

impl FlightDeskService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(GeminiTransport::new(
            cfg.gemini.api_key.clone(),
            cfg.gemini.model.clone(),
            cfg.gemini_timeout(),
        )?);

        let composer = Arc::new(GeminiComposer::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            cfg.gemini.clone(),
        ));

        let source = source::from_config(cfg)?;

        Ok(Self {
            turns: TurnEngine::new(source, composer),
        })
    }

    /// Handle one chat turn. Always produces a turn-ending reply, never an
    /// error.
    pub async fn answer(&self, message: &str) -> TurnOutcome {
        self.turns.run(message).await
    }
}
