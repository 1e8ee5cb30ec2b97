//! Application startup and lifecycle management.
//!
//! Credentials are loaded and the FCM client is built before the listener is
//! bound; a relay that cannot authenticate never serves traffic.

use crate::config::RelayConfig;
use crate::handlers::{health_check, metrics_endpoint, send_group_invitation, send_notification};
use crate::services::{init_metrics, FcmProvider, PushProvider, RelayMetrics};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{http_trace_layer, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub push_provider: Arc<dyn PushProvider>,
    pub metrics: Arc<RelayMetrics>,
}

impl AppState {
    pub fn new(push_provider: Arc<dyn PushProvider>, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            push_provider,
            metrics,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/send-notification", post(send_notification))
        .route("/send-group-invitation", post(send_group_invitation))
        .with_state(state)
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the FCM backend described by `config`.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider = FcmProvider::new(&config.fcm).map_err(|e| {
            tracing::error!("Failed to initialize Firebase credentials: {}", e);
            AppError::StartupError(anyhow::Error::new(e))
        })?;

        tracing::info!(
            project_id = %provider.project_id(),
            "Firebase credentials initialized"
        );

        let metrics = relay_metrics()?.with_recorder(init_metrics()?);
        let state = AppState::new(Arc::new(provider), Arc::new(metrics));

        Self::bind(config.common.port, state).await
    }

    /// Build the application around an arbitrary backend (port 0 = random).
    pub async fn build_with_provider(
        port: u16,
        push_provider: Arc<dyn PushProvider>,
    ) -> Result<Self, AppError> {
        let metrics = Arc::new(relay_metrics()?);
        Self::bind(port, AppState::new(push_provider, metrics)).await
    }

    async fn bind(port: u16, state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM, then drain in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn relay_metrics() -> Result<RelayMetrics, AppError> {
    RelayMetrics::new().map_err(|e| {
        tracing::error!("Failed to register metrics: {}", e);
        AppError::StartupError(anyhow::Error::new(e))
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
