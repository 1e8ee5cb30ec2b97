use axum::{extract::State, Json};
use validator::Validate;

use super::{deliver, parse_body, JsonObject};
use crate::error::RelayError;
use crate::models::{token_prefix, DeliveryResult, GroupInvitationRequest};
use crate::startup::AppState;

pub const ENDPOINT: &str = "send-group-invitation";
pub const MISSING_FIELDS: &str = "Missing required fields";

/// Convenience endpoint: derives title, body and routing data from the
/// invitation and sends it like any other notification.
#[tracing::instrument(skip(state, payload))]
pub async fn send_group_invitation(
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<Json<DeliveryResult>, RelayError> {
    let request: GroupInvitationRequest = parse_body(payload)?;

    if let Err(e) = request.validate() {
        tracing::warn!(error = %e, "Rejected group invitation request");
        return Err(RelayError::MissingFields(MISSING_FIELDS));
    }

    tracing::info!(
        token = %token_prefix(&request.fcm_token),
        to_user_id = %request.to_user_id,
        group_id = %request.group_id,
        "Sending group invitation"
    );

    deliver(&state, ENDPOINT, &request.to_message()).await
}
