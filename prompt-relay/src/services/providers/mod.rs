//! Generative-language provider abstraction.
//!
//! The relay handler only talks to a `TextProvider`; the Gemini
//! implementation lives in [`gemini`].

pub mod gemini;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0}")]
    NotConfigured(String),

    /// Upstream replied with a non-success status.
    #[error("Gemini API error: {body}")]
    Upstream { status: StatusCode, body: String },

    /// Upstream replied successfully but the candidate text could not be found.
    #[error("Invalid response structure from API.")]
    InvalidResponse,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Shape of the output requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Free-form text.
    #[default]
    Text,
    /// JSON constrained to the recipe schema.
    RecipeJson,
}

impl From<bool> for OutputFormat {
    fn from(is_json: bool) -> Self {
        if is_json {
            OutputFormat::RecipeJson
        } else {
            OutputFormat::Text
        }
    }
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Whether credentials are present. Checked before every request.
    fn is_configured(&self) -> bool;

    /// Send a single prompt and return the first candidate's text unchanged.
    async fn generate(&self, prompt: &str, format: OutputFormat) -> Result<String, ProviderError>;
}
