use prompt_relay::config::RelayConfig;
use prompt_relay::observability::init_tracing;
use prompt_relay::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = RelayConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "prompt-relay",
        &config.telemetry.log_level,
        config.telemetry.otlp_endpoint.as_deref(),
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tracing::info!(port = app.port(), "Starting prompt-relay");

    app.run_until_stopped().await
}
