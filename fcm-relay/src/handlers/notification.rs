use axum::{extract::State, Json};
use validator::Validate;

use super::{deliver, parse_body, JsonObject};
use crate::error::RelayError;
use crate::models::{token_prefix, DeliveryResult, NotificationRequest};
use crate::startup::AppState;

pub const ENDPOINT: &str = "send-notification";
pub const MISSING_FIELDS: &str = "Missing required fields: token, title, body";

#[tracing::instrument(skip(state, payload))]
pub async fn send_notification(
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<Json<DeliveryResult>, RelayError> {
    let request: NotificationRequest = parse_body(payload)?;

    if let Err(e) = request.validate() {
        tracing::warn!(error = %e, "Rejected notification request");
        return Err(RelayError::MissingFields(MISSING_FIELDS));
    }

    tracing::info!(
        token = %token_prefix(&request.token),
        title = %request.title,
        body = %request.body,
        "Sending notification"
    );

    deliver(&state, ENDPOINT, &request.to_message()).await
}
