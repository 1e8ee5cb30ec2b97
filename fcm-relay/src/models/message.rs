//! Outbound FCM message shape and the payload builder shared by every
//! endpoint.
//!
//! The struct serializes straight into the `message` object of the FCM
//! HTTP v1 `messages:send` request.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Android notification channel the mobile client registers at startup.
pub const NOTIFICATION_CHANNEL_ID: &str = "high_importance_channel";
pub const DEFAULT_SOUND: &str = "default";
pub const BADGE_COUNT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub token: String,
    pub notification: Notification,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidConfig {
    pub priority: AndroidPriority,
    pub notification: AndroidNotification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndroidNotification {
    pub channel_id: String,
    pub sound: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aps {
    pub sound: String,
    pub badge: u32,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            priority: AndroidPriority::High,
            notification: AndroidNotification {
                channel_id: NOTIFICATION_CHANNEL_ID.to_string(),
                sound: DEFAULT_SOUND.to_string(),
            },
        }
    }
}

impl Default for ApnsConfig {
    fn default() -> Self {
        Self {
            payload: ApnsPayload {
                aps: Aps {
                    sound: DEFAULT_SOUND.to_string(),
                    badge: BADGE_COUNT,
                },
            },
        }
    }
}

impl OutboundMessage {
    /// Build a message for a single device token.
    ///
    /// Platform hints are fixed: callers cannot change priority, channel,
    /// sound or badge.
    pub fn new(
        token: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        data: HashMap<String, String>,
    ) -> Self {
        Self {
            token: token.into(),
            notification: Notification {
                title: title.into(),
                body: body.into(),
            },
            data,
            android: AndroidConfig::default(),
            apns: ApnsConfig::default(),
        }
    }
}

/// Flatten caller-supplied data into the string-only map FCM accepts.
pub fn coerce_data(data: Option<&Map<String, Value>>) -> HashMap<String, String> {
    data.map(|entries| {
        entries
            .iter()
            .map(|(key, value)| (key.clone(), coerce_value(value)))
            .collect()
    })
    .unwrap_or_default()
}

/// Strings pass through untouched; everything else is rendered as compact JSON
/// (`3` → `"3"`, `true` → `"true"`, `null` → `"null"`). Whole floats below
/// 1e21 drop the fractional part (`3.0` → `"3"`).
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                // f64 Display never uses an exponent and prints -0 for -0.0.
                format!("{}", f + 0.0)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_floats_render_without_fraction() {
        let input = json!({
            "whole": 3.0,
            "negative": -2.0,
            "zero": -0.0,
            "large": 1e20,
            "fraction": 2.25,
        });

        let data = coerce_data(input.as_object());

        assert_eq!(data["whole"], "3");
        assert_eq!(data["negative"], "-2");
        assert_eq!(data["zero"], "0");
        assert_eq!(data["large"], "100000000000000000000");
        assert_eq!(data["fraction"], "2.25");
    }

    #[test]
    fn non_string_values_are_stringified() {
        let input = json!({
            "count": 3,
            "ratio": 0.5,
            "urgent": true,
            "missing": null,
            "tags": ["a", "b"],
            "nested": {"id": 7},
            "name": "plain",
        });

        let data = coerce_data(input.as_object());

        assert_eq!(data["count"], "3");
        assert_eq!(data["ratio"], "0.5");
        assert_eq!(data["urgent"], "true");
        assert_eq!(data["missing"], "null");
        assert_eq!(data["tags"], r#"["a","b"]"#);
        assert_eq!(data["nested"], r#"{"id":7}"#);
        assert_eq!(data["name"], "plain");
    }

    #[test]
    fn absent_data_yields_empty_map() {
        assert!(coerce_data(None).is_empty());
    }

    #[test]
    fn new_applies_fixed_platform_hints() {
        let message = OutboundMessage::new("tok", "Hello", "World", HashMap::new());

        assert_eq!(message.notification.title, "Hello");
        assert_eq!(message.notification.body, "World");
        assert_eq!(message.android.priority, AndroidPriority::High);
        assert_eq!(message.android.notification.channel_id, "high_importance_channel");
        assert_eq!(message.android.notification.sound, "default");
        assert_eq!(message.apns.payload.aps.sound, "default");
        assert_eq!(message.apns.payload.aps.badge, 1);
    }

    #[test]
    fn serializes_to_fcm_v1_shape() {
        let mut data = HashMap::new();
        data.insert("count".to_string(), "3".to_string());
        let message = OutboundMessage::new("device-token", "Hi", "There", data);

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            json!({
                "token": "device-token",
                "notification": {"title": "Hi", "body": "There"},
                "data": {"count": "3"},
                "android": {
                    "priority": "high",
                    "notification": {
                        "channel_id": "high_importance_channel",
                        "sound": "default"
                    }
                },
                "apns": {"payload": {"aps": {"sound": "default", "badge": 1}}}
            })
        );
    }

    #[test]
    fn empty_data_is_omitted_from_wire_format() {
        let message = OutboundMessage::new("t", "a", "b", HashMap::new());
        let value = serde_json::to_value(&message).unwrap();
        assert!(value.get("data").is_none());
    }
}
