use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::startup::AppState;

/// Liveness probe. Always OK while the process serves requests.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "prompt-relay",
            "version": env!("CARGO_PKG_VERSION"),
            "upstream_configured": state.text_provider.is_configured()
        })),
    )
}

/// Readiness probe. Not ready until the upstream API key is present.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.text_provider.is_configured() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
