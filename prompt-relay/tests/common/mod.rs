use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use prompt_relay::services::{GeminiConfig, GeminiTextProvider};
use prompt_relay::startup::{build_router, AppState, RELAY_PATH};
use secrecy::Secret;
use std::sync::Arc;
use tower::util::ServiceExt;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-test";

/// Path the relay calls on the mocked upstream.
pub fn upstream_path() -> String {
    format!("/models/{}:generateContent", TEST_MODEL)
}

/// Router wired to a Gemini provider that points at `upstream`.
pub fn relay_router(upstream: &MockServer, api_key: Option<&str>) -> Router {
    relay_router_at(&upstream.uri(), api_key)
}

pub fn relay_router_at(api_base: &str, api_key: Option<&str>) -> Router {
    let provider = GeminiTextProvider::new(GeminiConfig {
        api_key: api_key.map(|k| Secret::new(k.to_string())),
        model: TEST_MODEL.to_string(),
        api_base: api_base.to_string(),
    });

    build_router(AppState::new(Arc::new(provider)))
}

pub async fn send(router: Router, method: &str, body: &str) -> Response<Body> {
    router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(RELAY_PATH)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn read_body(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, String::from_utf8(body.to_vec()).expect("Body is not UTF-8"))
}
