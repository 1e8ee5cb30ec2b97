//! Metrics collection for fcm-relay.
//!
//! Counters live in a per-application Prometheus registry held by
//! `AppState`. Latency histograms go through the `metrics` facade and are
//! rendered by the process-wide Prometheus recorder when one is installed.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_INVALID_TOKEN: &str = "invalid_token";
pub const STATUS_DELIVERY_FAILURE: &str = "delivery_failure";

/// Install the global Prometheus recorder once and return its handle.
pub fn init_metrics() -> Result<PrometheusHandle, AppError> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::StartupError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    Ok(METRICS_HANDLE.get_or_init(|| handle).clone())
}

pub struct RelayMetrics {
    registry: Registry,
    notifications: IntCounterVec,
    provider_calls: IntCounterVec,
    recorder: Option<PrometheusHandle>,
}

impl RelayMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let notifications = IntCounterVec::new(
            Opts::new(
                "notification_sent_total",
                "Total notifications handled by endpoint and outcome",
            ),
            &["endpoint", "status"],
        )?;

        let provider_calls = IntCounterVec::new(
            Opts::new(
                "notification_provider_calls_total",
                "Total provider API calls by provider and status",
            ),
            &["provider", "status"],
        )?;

        registry.register(Box::new(notifications.clone()))?;
        registry.register(Box::new(provider_calls.clone()))?;

        Ok(Self {
            registry,
            notifications,
            provider_calls,
            recorder: None,
        })
    }

    /// Also render whatever the global recorder has collected.
    pub fn with_recorder(mut self, handle: PrometheusHandle) -> Self {
        self.recorder = Some(handle);
        self
    }

    pub fn record_notification(&self, endpoint: &str, status: &str) {
        self.notifications
            .with_label_values(&[endpoint, status])
            .inc();
    }

    pub fn record_provider_call(&self, provider: &'static str, success: bool, elapsed: Duration) {
        let status = if success { "success" } else { "error" };
        self.provider_calls
            .with_label_values(&[provider, status])
            .inc();

        ::metrics::histogram!(
            "notification_provider_call_duration_seconds",
            "provider" => provider,
            "status" => status
        )
        .record(elapsed.as_secs_f64());
    }

    /// Metrics output in Prometheus text format.
    pub fn render(&self) -> String {
        let mut output = self
            .recorder
            .as_ref()
            .map(|handle| handle.render())
            .unwrap_or_default();

        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "Failed to encode metrics");
        }
        output.push_str(&String::from_utf8_lossy(&buffer));

        output
    }
}
