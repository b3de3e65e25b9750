use anyhow::{Context, Result};
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SUBSCRIBERS_FILE: &str = "subscribers.json";

/// Application configuration loaded from environment variables.
/// Only `PORT` is fatal when malformed; missing credentials degrade to warnings.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub database_url: Option<String>,
    pub subscribers_file: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_model: optional_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            database_url: optional_env("DATABASE_URL"),
            subscribers_file: optional_env("SUBSCRIBERS_FILE")
                .unwrap_or_else(|| DEFAULT_SUBSCRIBERS_FILE.to_string()),
            port: optional_env("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Logs a warning for each optional setting that leaves a feature degraded.
    /// Called once logging is up, since `from_env` runs before the subscriber exists.
    pub fn warn_missing(&self) {
        if self.openai_api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; /cast-spell will fail until it is configured");
        }
        if self.database_url.is_none() {
            warn!("DATABASE_URL is not set; cast spells will not be recorded");
        }
    }
}

/// Reads an env var, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
impl Config {
    /// A fully-populated config that never touches the process environment.
    pub fn for_tests() -> Self {
        Config {
            openai_api_key: Some("sk-test".to_string()),
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            database_url: None,
            subscribers_file: DEFAULT_SUBSCRIBERS_FILE.to_string(),
            port: 3000,
            rust_log: "info".to_string(),
        }
    }
}
