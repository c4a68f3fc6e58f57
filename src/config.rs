use serde::{Deserialize, Serialize};

use crate::clients::judge::DEFAULT_JUDGE_API_URL;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Log level for this crate's tracing directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Database URL; persistence endpoints are disabled without it
    pub db_url: Option<String>,

    /// Execution service endpoint
    #[serde(default = "default_judge_api_url")]
    pub judge_api_url: String,

    /// RapidAPI key for the execution service
    pub judge_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables or app.env file.
    /// Runs before tracing is initialized, so it stays silent; the caller
    /// logs the outcome.
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        envy::from_env::<Config>().map_err(ConfigError::EnvError)
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default tracing directive, used when RUST_LOG is not set
    pub fn log_filter(&self) -> String {
        format!(
            "codesync={},tower_http=debug,axum::rejection=trace,info",
            self.log_level
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            db_url: None,
            judge_api_url: default_judge_api_url(),
            judge_api_key: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_judge_api_url() -> String {
    DEFAULT_JUDGE_API_URL.to_string()
}
