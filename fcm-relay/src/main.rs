use fcm_relay::config::RelayConfig;
use fcm_relay::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("fcm-relay", &log_level, otlp_endpoint.as_deref());

    let config = RelayConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start fcm-relay: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let port = app.port();
    tracing::info!("FCM Notification Server running on port {}", port);
    tracing::info!("Health check: http://localhost:{}/", port);
    tracing::info!("Send notification: POST http://localhost:{}/send-notification", port);
    tracing::info!("Metrics: http://localhost:{}/metrics", port);

    app.run_until_stopped().await
}
