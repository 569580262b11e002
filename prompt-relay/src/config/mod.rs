use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::env;

/// Gemini REST API base URL.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for both plain text and structured recipe output.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-05-20";

/// Environment variable holding the upstream API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub gemini: GeminiSettings,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// Absent when `GEMINI_API_KEY` is unset or blank. The service still
    /// starts; every relay request then fails with a configuration error.
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// OTLP collector endpoint. Spans are only exported when this is set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl RelayConfig {
    /// Load configuration from an optional `configuration` file, `APP__*`
    /// variables, and the provider-specific variables (`GEMINI_API_KEY`,
    /// `GEMINI_MODEL`, `GEMINI_API_BASE`, `OTLP_ENDPOINT`).
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("gemini.model", DEFAULT_GEMINI_MODEL)?
            .set_default("gemini.api_base", DEFAULT_GEMINI_API_BASE)?
            .set_default("telemetry.log_level", "info")?
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("gemini.api_key", non_blank_env(API_KEY_ENV))?
            .set_override_option("gemini.model", non_blank_env("GEMINI_MODEL"))?
            .set_override_option("gemini.api_base", non_blank_env("GEMINI_API_BASE"))?
            .set_override_option("telemetry.otlp_endpoint", non_blank_env("OTLP_ENDPOINT"))?
            .build()?;

        let mut relay: RelayConfig = config.try_deserialize()?;
        relay.gemini.api_key = relay
            .gemini
            .api_key
            .filter(|key| !key.expose_secret().trim().is_empty());

        Ok(relay)
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}
