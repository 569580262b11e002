//! Application startup and lifecycle management.

use crate::config::RelayConfig;
use crate::error::AppError;
use crate::handlers::{health_check, readiness_check, relay_prompt};
use crate::middleware::{make_request_span, request_id_middleware};
use crate::services::{GeminiConfig, GeminiTextProvider, TextProvider};
use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Path the relay is served on.
pub const RELAY_PATH: &str = "/api/get-nutrition-info";

/// Path used by existing serverless-function callers.
pub const LEGACY_RELAY_PATH: &str = "/.netlify/functions/get-nutrition-info";

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub text_provider: Arc<dyn TextProvider>,
}

impl AppState {
    pub fn new(text_provider: Arc<dyn TextProvider>) -> Self {
        Self { text_provider }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        let gemini_config = GeminiConfig {
            api_key: config.gemini.api_key.clone(),
            model: config.gemini.model.clone(),
            api_base: config.gemini.api_base.clone(),
        };
        Self::new(Arc::new(GeminiTextProvider::new(gemini_config)))
    }
}

/// Build the HTTP router.
///
/// The relay routes accept every method; the handler itself answers 405.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route(RELAY_PATH, any(relay_prompt))
        .route(LEGACY_RELAY_PATH, any(relay_prompt))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config);

        if state.text_provider.is_configured() {
            tracing::info!(model = %config.gemini.model, "Initialized Gemini text provider");
        } else {
            tracing::warn!("GEMINI_API_KEY is not set; relay requests will fail until it is");
        }

        Self::build_with_state(&config, state).await
    }

    /// Build the application around an existing state (used by tests).
    pub async fn build_with_state(config: &RelayConfig, state: AppState) -> Result<Self, AppError> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Invalid listen address {}:{}: {}",
                    config.server.host,
                    config.server.port,
                    e
                ))
            })?;

        // Port 0 binds a random port
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "HTTP server bound");

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
