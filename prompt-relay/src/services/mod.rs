pub mod providers;

pub use providers::gemini::{GeminiConfig, GeminiTextProvider};
pub use providers::{OutputFormat, ProviderError, TextProvider};
