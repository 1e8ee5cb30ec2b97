//! HTTP handlers for fcm-relay.

pub mod group_invitation;
pub mod health;
pub mod metrics;
pub mod notification;

pub use group_invitation::send_group_invitation;
pub use health::health_check;
pub use metrics::metrics_endpoint;
pub use notification::send_notification;

use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Instant;

use crate::error::RelayError;
use crate::models::{DeliveryResult, OutboundMessage};
use crate::services::metrics::{STATUS_DELIVERED, STATUS_DELIVERY_FAILURE, STATUS_INVALID_TOKEN};
use crate::startup::AppState;

/// Request bodies must be JSON objects; arrays and scalars are rejected
/// before any field is read.
pub type JsonObject = Result<Json<Map<String, Value>>, JsonRejection>;

pub(crate) fn parse_body<T: DeserializeOwned>(payload: JsonObject) -> Result<T, RelayError> {
    let Json(object) = payload?;
    serde_json::from_value(Value::Object(object))
        .map_err(|e| RelayError::MalformedBody(e.to_string()))
}

/// Hand one message to the backend and map the outcome. No retries.
pub(crate) async fn deliver(
    state: &AppState,
    endpoint: &'static str,
    message: &OutboundMessage,
) -> Result<Json<DeliveryResult>, RelayError> {
    let provider = state.push_provider.as_ref();
    let started = Instant::now();
    let outcome = provider.send(message).await;
    state
        .metrics
        .record_provider_call(provider.name(), outcome.is_ok(), started.elapsed());

    match outcome {
        Ok(message_id) => {
            state.metrics.record_notification(endpoint, STATUS_DELIVERED);
            tracing::info!(message_id = %message_id, "Notification sent successfully");
            Ok(Json(DeliveryResult::delivered(message_id)))
        }
        Err(e) => {
            let error = RelayError::from_provider(&e);
            let status = if matches!(error, RelayError::InvalidToken { .. }) {
                STATUS_INVALID_TOKEN
            } else {
                STATUS_DELIVERY_FAILURE
            };
            state.metrics.record_notification(endpoint, status);
            tracing::error!(
                error = %e,
                code = ?e.code(),
                status = %error.status(),
                "Failed to send notification"
            );
            Err(error)
        }
    }
}
