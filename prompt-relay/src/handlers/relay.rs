//! Prompt relay endpoint.
//!
//! Accepts `{ "prompt": string, "isJson"?: bool }`, forwards the prompt to the
//! configured text provider exactly once and answers `{ "text": string }`.

use axum::{
    extract::{Request, State},
    http::Method,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, RelayError};
use crate::services::{OutputFormat, ProviderError};
use crate::startup::AppState;

/// Inbound relay request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    /// Ask for structured recipe JSON instead of free text. `null` means no.
    #[serde(default)]
    pub is_json: Option<bool>,
}

/// Successful relay response. `text` is the model output verbatim, even when
/// structured JSON was requested.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub text: String,
}

/// Relay a prompt to the upstream model.
///
/// Mounted for every method so that the method check happens here, before
/// the body is read. The body is read without a size limit.
pub async fn relay_prompt(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<RelayResponse>, RelayError> {
    relay(&state, request).await.map(Json).map_err(|err| {
        if let RelayError::Unclassified(ref cause) = err {
            tracing::error!(error = %cause, "Relay request failed");
        }
        err
    })
}

async fn relay(state: &AppState, request: Request) -> Result<RelayResponse, RelayError> {
    if request.method() != Method::POST {
        return Err(ClientError::MethodNotAllowed.into());
    }

    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(anyhow::Error::from)?;
    let request: RelayRequest = serde_json::from_slice(&body).map_err(anyhow::Error::from)?;

    if !state.text_provider.is_configured() {
        return Err(anyhow::anyhow!("GEMINI_API_KEY environment variable not set.").into());
    }

    let prompt = match request.prompt {
        Some(prompt) if !prompt.is_empty() => prompt,
        _ => return Err(ClientError::MissingPrompt.into()),
    };
    let format = OutputFormat::from(request.is_json.unwrap_or_default());

    tracing::info!(prompt_len = prompt.len(), format = ?format, "Relaying prompt");

    let text = state
        .text_provider
        .generate(&prompt, format)
        .await
        .map_err(|err| match err {
            ProviderError::Upstream { status, body } => RelayError::Upstream { status, body },
            ProviderError::InvalidResponse => RelayError::InvalidResponseStructure,
            other => RelayError::Unclassified(anyhow::Error::new(other)),
        })?;

    Ok(RelayResponse { text })
}
