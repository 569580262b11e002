//! Gemini AI provider implementation.
//!
//! Issues one non-streaming `generateContent` call per prompt. The API key
//! travels only as the `key` query parameter.

use super::{OutputFormat, ProviderError, TextProvider};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    /// No request timeout is set; the call runs until the upstream answers or the connection fails.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Build the API URL for the given method, without credentials.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    async fn generate(&self, prompt: &str, format: OutputFormat) -> Result<String, ProviderError> {
        let api_key = self.api_key().ok_or_else(|| {
            ProviderError::NotConfigured("GEMINI_API_KEY environment variable not set.".to_string())
        })?;

        let request = GenerateContentRequest::new(prompt, format);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            format = ?format,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Gemini API error");
            return Err(ProviderError::Upstream { status, body });
        }

        let api_response: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        api_response.into_first_text().ok_or_else(|| {
            tracing::error!(body = %body, "Invalid response structure from Gemini API");
            ProviderError::InvalidResponse
        })
    }
}

/// Response schema for structured recipe output.
fn recipe_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "recipeName": { "type": "STRING" },
            "description": { "type": "STRING" },
            "ingredients": { "type": "ARRAY", "items": { "type": "STRING" } },
            "instructions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "nutrition": {
                "type": "OBJECT",
                "properties": {
                    "calories": { "type": "STRING" },
                    "protein": { "type": "STRING" },
                    "carbs": { "type": "STRING" },
                    "fat": { "type": "STRING" }
                }
            }
        },
        "required": ["recipeName", "description", "ingredients", "instructions", "nutrition"]
    })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn new(prompt: &str, format: OutputFormat) -> Self {
        let generation_config = match format {
            OutputFormat::Text => None,
            OutputFormat::RecipeJson => Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: recipe_schema(),
            }),
        };

        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

// Every level is optional so that a well-formed JSON body with the wrong
// shape surfaces as `InvalidResponse` rather than a decode failure.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if every step is present.
    fn into_first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> GeminiTextProvider {
        GeminiTextProvider::new(GeminiConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            model: "gemini-2.5-flash-preview-05-20".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
        })
    }

    #[test]
    fn text_request_has_no_generation_config() {
        let body = serde_json::to_value(GenerateContentRequest::new("hello", OutputFormat::Text))
            .unwrap();

        assert_eq!(
            body,
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }] })
        );
    }

    #[test]
    fn recipe_request_pins_the_schema() {
        let body =
            serde_json::to_value(GenerateContentRequest::new("pasta", OutputFormat::RecipeJson))
                .unwrap();

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(
            config["responseSchema"]["required"],
            json!(["recipeName", "description", "ingredients", "instructions", "nutrition"])
        );
        assert_eq!(
            config["responseSchema"]["properties"]["ingredients"],
            json!({ "type": "ARRAY", "items": { "type": "STRING" } })
        );
        assert_eq!(
            config["responseSchema"]["properties"]["nutrition"]["properties"]["fat"]["type"],
            "STRING"
        );
        assert_eq!(body["contents"][0]["parts"][0]["text"], "pasta");
    }

    #[test]
    fn first_text_is_extracted() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "first" }, { "text": "second" }] } },
                { "content": { "parts": [{ "text": "other candidate" }] } }
            ]
        }))
        .unwrap();

        assert_eq!(response.into_first_text().as_deref(), Some("first"));
    }

    #[test]
    fn missing_levels_yield_none() {
        for body in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{}] }),
            json!({ "candidates": [{ "content": {} }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{}] } }] }),
        ] {
            let response: GenerateContentResponse = serde_json::from_value(body.clone()).unwrap();
            assert!(response.into_first_text().is_none(), "expected none for {}", body);
        }
    }

    #[test]
    fn url_omits_the_key_and_trailing_slash() {
        assert_eq!(
            provider(Some("secret")).api_url("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-05-20:generateContent"
        );
    }

    #[test]
    fn empty_key_is_not_configured() {
        assert!(provider(Some("secret")).is_configured());
        assert!(!provider(Some("")).is_configured());
        assert!(!provider(None).is_configured());
    }
}
