use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for flightdesk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub store: StoreConfig,
    pub amadeus: AmadeusConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: String,
}

/// Which flight-source strategy the adapter is constructed with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Static,
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub mode: BackendMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub top_k: i32,
    pub top_p: f32,
    pub max_output_tokens: i32,
    pub stop_sequences: Vec<String>,
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// Always returns a valid config - never fails.
    pub fn load() -> Self {
        if dotenvy::dotenv().is_ok() {
            tracing::info!("Loaded .env from current directory");
        }

        let config_path =
            env::var("FLIGHTDESK_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(name) = env::var("FLIGHTDESK_SERVER_NAME") {
            self.server.name = name;
        }
        if let Ok(bind) = env::var("FLIGHTDESK_BIND") {
            self.server.bind = bind;
        }

        // Backend mode override
        if let Ok(mode) = env::var("FLIGHTDESK_BACKEND") {
            match mode.to_lowercase().as_str() {
                "static" => self.backend.mode = BackendMode::Static,
                "live" => self.backend.mode = BackendMode::Live,
                other => {
                    tracing::warn!("Unknown FLIGHTDESK_BACKEND value: {} - keeping current", other)
                }
            }
        }

        // Store overrides
        if let Ok(path) = env::var("FLIGHTDESK_DB_PATH") {
            self.store.db_path = path;
        }

        // Amadeus overrides
        if let Ok(key) = env::var("AMADEUS_API_KEY") {
            self.amadeus.api_key = key;
        }
        if let Ok(secret) = env::var("AMADEUS_API_SECRET") {
            self.amadeus.api_secret = secret;
        }
        if let Ok(url) = env::var("AMADEUS_BASE_URL") {
            self.amadeus.base_url = url;
        }

        // Gemini overrides
        if let Ok(api_key) = env::var("GOOGLE_API_KEY") {
            self.gemini.api_key = api_key;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Ok(temp) = env::var("GEMINI_TEMPERATURE") {
            if let Ok(t) = temp.parse() {
                self.gemini.temperature = t;
            }
        }
        if let Ok(max) = env::var("GEMINI_MAX_OUTPUT_TOKENS") {
            if let Ok(m) = max.parse() {
                self.gemini.max_output_tokens = m;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("Invalid server bind address: {}", self.server.bind).into());
        }

        if self.gemini.api_key.is_empty() {
            return Err("GOOGLE_API_KEY environment variable must be set".into());
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err("Gemini temperature must be between 0.0 and 2.0".into());
        }
        if self.gemini.max_output_tokens <= 0 {
            return Err("Gemini max_output_tokens must be positive".into());
        }

        if self.backend.mode == BackendMode::Live
            && (self.amadeus.api_key.is_empty() || self.amadeus.api_secret.is_empty())
        {
            return Err(
                "AMADEUS_API_KEY and AMADEUS_API_SECRET must be set for the live backend".into(),
            );
        }
        if self.backend.mode == BackendMode::Static && self.store.db_path.is_empty() {
            return Err("Store db_path cannot be empty for the static backend".into());
        }

        Ok(())
    }

    pub fn gemini_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_seconds)
    }

    pub fn amadeus_timeout(&self) -> Duration {
        Duration::from_secs(self.amadeus.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "flightdesk".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                bind: "127.0.0.1:8080".to_string(),
            },
            backend: BackendConfig {
                mode: BackendMode::Static,
            },
            store: StoreConfig {
                db_path: "FlightData.db".to_string(),
            },
            amadeus: AmadeusConfig {
                api_key: env::var("AMADEUS_API_KEY").unwrap_or_default(),
                api_secret: env::var("AMADEUS_API_SECRET").unwrap_or_default(),
                base_url: "https://test.api.amadeus.com".to_string(),
                timeout_seconds: 30,
            },
            gemini: GeminiConfig {
                api_key: env::var("GOOGLE_API_KEY").unwrap_or_else(|_| {
                    tracing::warn!("GOOGLE_API_KEY not set");
                    String::new()
                }),
                model: "gemini-1.5-flash".to_string(),
                temperature: 0.3,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 1024,
                stop_sequences: Vec::new(),
                timeout_seconds: 30,
            },
        }
    }
}
