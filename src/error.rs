use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlightDeskError>;

/// Error taxonomy for one chat turn. Extraction and mapping errors are
/// user-correctable; backend and LLM errors surface as apologies. Nothing
/// here is ever re-raised past the turn boundary.
#[derive(Error, Debug)]
pub enum FlightDeskError {
    #[error("could not resolve an origin or destination from the query")]
    MissingRoute,

    #[error("no airport code mapping for city: {0}")]
    UnsupportedCity(String),

    #[error("flight backend unavailable: {0}")]
    Backend(String),

    #[error("malformed flight record: {0}")]
    MalformedRecord(String),

    #[error("LLM collaborator unavailable: {0}")]
    Llm(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FlightDeskError {
    /// The turn-ending message shown to the user for this error. The chat
    /// transport always receives one of these, never a raw fault.
    pub fn user_message(&self) -> String {
        match self {
            FlightDeskError::MissingRoute => {
                "I couldn't work out where you're flying from or to. Please \
                 tell me both an origin and a destination city, for example \
                 \"flights from Delhi to Mumbai\"."
                    .to_string()
            }
            FlightDeskError::UnsupportedCity(city) => {
                format!(
                    "I'm sorry, I don't have airport information for {city}. \
                     Supported cities are Bangalore, Delhi, Mumbai, Chennai, \
                     Kolkata, Hyderabad, Pune and Jaipur."
                )
            }
            FlightDeskError::Backend(_) | FlightDeskError::Database(_) => {
                "I'm sorry, I couldn't reach the flight data service just now. \
                 Please try again in a moment."
                    .to_string()
            }
            _ => "I'm sorry, something went wrong while handling your request. \
                  Please try again."
                .to_string(),
        }
    }
}
