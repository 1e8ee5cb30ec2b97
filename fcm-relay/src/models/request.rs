use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use validator::Validate;

use super::message::{coerce_data, coerce_value, OutboundMessage};

pub const GROUP_INVITATION_TITLE: &str = "Group Invitation";
pub const GROUP_INVITATION_TYPE: &str = "group_invitation";
pub const GROUP_INVITATION_SCREEN: &str = "requests";
pub const FLUTTER_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Body of `POST /send-notification`.
///
/// Required fields that are missing or `null` deserialize to an empty string
/// so that validation, not parsing, rejects them.
#[derive(Debug, Deserialize, Validate)]
pub struct NotificationRequest {
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl NotificationRequest {
    pub fn to_message(&self) -> OutboundMessage {
        OutboundMessage::new(
            self.token.as_str(),
            self.title.as_str(),
            self.body.as_str(),
            coerce_data(self.data.as_ref()),
        )
    }
}

/// Body of `POST /send-group-invitation`.
///
/// User and request ids may arrive as numbers; they are stringified the same
/// way as notification data.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupInvitationRequest {
    #[serde(default, deserialize_with = "coerced")]
    #[validate(length(min = 1, message = "toUserId is required"))]
    pub to_user_id: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(length(min = 1, message = "fromUserDisplayName is required"))]
    pub from_user_display_name: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(length(min = 1, message = "groupName is required"))]
    pub group_name: String,
    #[serde(default, deserialize_with = "coerced")]
    pub group_id: String,
    #[serde(default, deserialize_with = "coerced")]
    pub request_id: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(length(min = 1, message = "fcmToken is required"))]
    pub fcm_token: String,
}

impl GroupInvitationRequest {
    pub fn body_text(&self) -> String {
        format!(
            "{} invited you to join \"{}\"",
            self.from_user_display_name, self.group_name
        )
    }

    /// Routing data the mobile client uses to open the requests screen.
    pub fn data(&self) -> HashMap<String, String> {
        HashMap::from([
            ("type".to_string(), GROUP_INVITATION_TYPE.to_string()),
            ("screen".to_string(), GROUP_INVITATION_SCREEN.to_string()),
            ("groupId".to_string(), self.group_id.clone()),
            ("groupName".to_string(), self.group_name.clone()),
            ("requestId".to_string(), self.request_id.clone()),
            (
                "fromUserDisplayName".to_string(),
                self.from_user_display_name.clone(),
            ),
            ("click_action".to_string(), FLUTTER_CLICK_ACTION.to_string()),
        ])
    }

    pub fn to_message(&self) -> OutboundMessage {
        OutboundMessage::new(
            self.fcm_token.as_str(),
            GROUP_INVITATION_TITLE,
            self.body_text(),
            self.data(),
        )
    }
}

fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn coerced<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(value) => coerce_value(&value),
    })
}
