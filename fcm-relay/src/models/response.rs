use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Outcome of a relay request, returned synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl DeliveryResult {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
            code: None,
        }
    }

    pub fn failed(error: impl Into<String>, code: Option<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            code,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            message: "FCM Notification Server is running",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delivered_serializes_message_id_only() {
        let value = serde_json::to_value(DeliveryResult::delivered("abc123")).unwrap();
        assert_eq!(value, json!({"success": true, "messageId": "abc123"}));
    }

    #[test]
    fn failed_omits_absent_code() {
        let value = serde_json::to_value(DeliveryResult::failed("boom", None)).unwrap();
        assert_eq!(value, json!({"success": false, "error": "boom"}));
    }
}
