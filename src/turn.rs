use chrono::NaiveDate;
use std::sync::Arc;

use crate::compose::Composer;
use crate::error::FlightDeskError;
use crate::extract;
use crate::filter;
use crate::source::FlightSource;

/// Phases of one chat turn. `Failed` always carries a user-facing message;
/// no error crosses the turn boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Extracting,
    Fetching,
    Filtering,
    Composing,
    AwaitingLlm,
    Done,
    Failed,
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: String,
    pub phase: TurnPhase,
}

/// Drives one turn through the pipeline: extract, fetch, filter, compose,
/// await the LLM. All state is turn-local; nothing is shared across turns.
pub struct TurnEngine {
    source: Arc<dyn FlightSource>,
    composer: Arc<dyn Composer>,
}

impl TurnEngine {
    pub fn new(source: Arc<dyn FlightSource>, composer: Arc<dyn Composer>) -> Self {
        Self { source, composer }
    }

    pub async fn run(&self, text: &str) -> TurnOutcome {
        self.run_with_date(text, chrono::Local::now().date_naive())
            .await
    }

    /// Like `run`, with the clock injected for deterministic tests.
    pub async fn run_with_date(&self, text: &str, today: NaiveDate) -> TurnOutcome {
        let mut phase = TurnPhase::Idle;

        // Filters are extracted exactly once per turn.
        self.enter(&mut phase, TurnPhase::Extracting);
        let spec = match extract::extract(text, today) {
            Ok(spec) => spec,
            Err(e) => return self.fail(&mut phase, e),
        };

        // The fetch contract needs both ends of the route.
        let (origin, destination) = match (&spec.origin, &spec.destination) {
            (Some(o), Some(d)) => (o.clone(), d.clone()),
            (Some(_), None) => {
                return self.fail_with(
                    &mut phase,
                    "Got it, and where would you like to fly to? Please tell me a destination city.",
                );
            }
            (None, Some(_)) => {
                return self.fail_with(
                    &mut phase,
                    "Got it, and where are you flying from? Please tell me an origin city.",
                );
            }
            (None, None) => return self.fail(&mut phase, FlightDeskError::MissingRoute),
        };

        self.enter(&mut phase, TurnPhase::Fetching);
        let records = match self
            .source
            .fetch(&origin, &destination, spec.departure_date)
            .await
        {
            Ok(records) => records,
            Err(e) => return self.fail(&mut phase, e),
        };

        // No backend results at all: fixed fallback, the LLM is not called.
        if records.is_empty() {
            self.enter(&mut phase, TurnPhase::Done);
            return TurnOutcome {
                reply: self.composer.no_results_message(&spec),
                phase,
            };
        }

        self.enter(&mut phase, TurnPhase::Filtering);
        let filtered = filter::apply(records, &spec);
        let table = filter::render_table(&filtered, &spec);

        self.enter(&mut phase, TurnPhase::Composing);
        self.enter(&mut phase, TurnPhase::AwaitingLlm);
        let reply = self.composer.compose(&table, &spec).await;

        self.enter(&mut phase, TurnPhase::Done);
        TurnOutcome { reply, phase }
    }

    fn enter(&self, phase: &mut TurnPhase, next: TurnPhase) {
        tracing::debug!(from = ?phase, to = ?next, "turn phase transition");
        *phase = next;
    }

    fn fail(&self, phase: &mut TurnPhase, e: FlightDeskError) -> TurnOutcome {
        tracing::warn!(in_phase = ?phase, "turn failed: {e}");
        self.enter(phase, TurnPhase::Failed);
        TurnOutcome {
            reply: e.user_message(),
            phase: *phase,
        }
    }

    fn fail_with(&self, phase: &mut TurnPhase, message: &str) -> TurnOutcome {
        self.enter(phase, TurnPhase::Failed);
        TurnOutcome {
            reply: message.to_string(),
            phase: *phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::{FilterSpec, FlightRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockSource {
        result: Mutex<Option<Result<Vec<FlightRecord>>>>,
    }

    impl MockSource {
        fn with(result: Result<Vec<FlightRecord>>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
            })
        }
    }

    #[async_trait]
    impl FlightSource for MockSource {
        async fn fetch(
            &self,
            _origin: &str,
            _destination: &str,
            _departure_date: NaiveDate,
        ) -> Result<Vec<FlightRecord>> {
            self.result
                .lock()
                .expect("mock source mutex should not be poisoned")
                .take()
                .unwrap_or_else(|| Ok(vec![]))
        }
    }

    /// Composer that echoes the table so tests can see what reached the LLM
    /// boundary.
    struct EchoComposer;

    #[async_trait]
    impl Composer for EchoComposer {
        async fn compose(&self, table: &str, _spec: &FilterSpec) -> String {
            format!("LLM says:\n{table}")
        }

        fn no_results_message(&self, _spec: &FilterSpec) -> String {
            "fallback: nothing found".to_string()
        }
    }

    fn record(flight: &str, time: &str, price: f64) -> FlightRecord {
        FlightRecord {
            flight_number: flight.to_string(),
            origin: "Delhi".to_string(),
            destination: "Mumbai".to_string(),
            departure_date: "2025-06-01".to_string(),
            departure_time: time.to_string(),
            arrival_date: "2025-06-01".to_string(),
            arrival_time: "23:00:00".to_string(),
            price,
            airline: "IndiGo".to_string(),
            duration: "2h 5m".to_string(),
            duration_min: 125,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    #[tokio::test]
    async fn test_full_turn_filters_and_composes() {
        let source = MockSource::with(Ok(vec![
            record("6E1", "10:00:00", 4000.0),
            record("6E2", "08:00:00", 6000.0),
            record("6E3", "09:00:00", 4500.0),
        ]));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine
            .run_with_date("flights from Delhi to Mumbai under 5000", today())
            .await;
        assert_eq!(outcome.phase, TurnPhase::Done);
        assert!(outcome.reply.starts_with("LLM says:"));
        assert!(outcome.reply.contains("6E3"));
        assert!(!outcome.reply.contains("6E2"), "6000 > ceiling must be dropped");
        assert!(outcome.reply.contains("Showing 2 flights under ₹5,000."));
    }

    #[tokio::test]
    async fn test_missing_route_never_reaches_backend_or_llm() {
        let source = MockSource::with(Err(FlightDeskError::Backend(
            "should not be called".to_string(),
        )));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine.run_with_date("something cheap please", today()).await;
        assert_eq!(outcome.phase, TurnPhase::Failed);
        assert!(outcome.reply.contains("origin and a destination"));
    }

    #[tokio::test]
    async fn test_partial_route_asks_for_the_missing_role() {
        let source = MockSource::with(Ok(vec![]));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine.run_with_date("flights from Delhi", today()).await;
        assert_eq!(outcome.phase, TurnPhase::Failed);
        assert!(outcome.reply.contains("destination"));
    }

    #[tokio::test]
    async fn test_backend_error_becomes_apology() {
        let source = MockSource::with(Err(FlightDeskError::Backend("boom".to_string())));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine
            .run_with_date("flights from Delhi to Mumbai", today())
            .await;
        assert_eq!(outcome.phase, TurnPhase::Failed);
        assert!(outcome.reply.contains("couldn't reach the flight data service"));
    }

    #[tokio::test]
    async fn test_empty_backend_result_bypasses_llm() {
        let source = MockSource::with(Ok(vec![]));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine
            .run_with_date("flights from Delhi to Mumbai", today())
            .await;
        assert_eq!(outcome.phase, TurnPhase::Done);
        assert_eq!(outcome.reply, "fallback: nothing found");
    }

    #[tokio::test]
    async fn test_zero_after_filtering_sends_no_flights_sentence_to_llm() {
        let source = MockSource::with(Ok(vec![record("6E1", "10:00:00", 9000.0)]));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine
            .run_with_date("flights from Delhi to Mumbai under 5000", today())
            .await;
        assert_eq!(outcome.phase, TurnPhase::Done);
        assert!(outcome
            .reply
            .contains("Sorry, no flights found under ₹5,000 for this route and date."));
    }

    #[tokio::test]
    async fn test_time_bucket_flows_through_the_turn() {
        let source = MockSource::with(Ok(vec![
            record("6E1", "08:00:00", 4000.0),
            record("6E2", "19:00:00", 4000.0),
        ]));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine
            .run_with_date("morning flights from Delhi to Mumbai", today())
            .await;
        assert_eq!(outcome.phase, TurnPhase::Done);
        assert!(outcome.reply.contains("6E1"));
        assert!(!outcome.reply.contains("6E2"));
    }

    #[tokio::test]
    async fn test_unsupported_city_surfaces_supported_list() {
        let source = MockSource::with(Err(FlightDeskError::UnsupportedCity("Goa".to_string())));
        let engine = TurnEngine::new(source, Arc::new(EchoComposer));
        let outcome = engine
            .run_with_date("flights from Delhi to Mumbai", today())
            .await;
        assert_eq!(outcome.phase, TurnPhase::Failed);
        assert!(outcome.reply.contains("Supported cities"));
    }
}
