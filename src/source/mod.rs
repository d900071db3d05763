use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::config::{BackendMode, Config};
use crate::error::Result;
use crate::models::FlightRecord;

pub mod live;
pub mod store;

pub use live::LiveOffersSource;
pub use store::StaticStore;

/// One contract over both flight backends. The strategy is picked once at
/// construction; call sites never branch on the mode.
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
    ) -> Result<Vec<FlightRecord>>;
}

/// Construct the strategy named by the config.
pub fn from_config(config: &Config) -> Result<Arc<dyn FlightSource>> {
    match config.backend.mode {
        BackendMode::Static => {
            tracing::info!(db_path = %config.store.db_path, "using static flight store");
            Ok(Arc::new(StaticStore::new(config.store.db_path.clone())))
        }
        BackendMode::Live => {
            tracing::info!(base_url = %config.amadeus.base_url, "using live flight-offers API");
            Ok(Arc::new(LiveOffersSource::new(
                config.amadeus.api_key.clone(),
                config.amadeus.api_secret.clone(),
                config.amadeus.base_url.clone(),
                config.amadeus_timeout(),
            )?))
        }
    }
}
