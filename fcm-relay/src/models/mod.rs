pub mod message;
pub mod request;
pub mod response;

pub use message::{coerce_data, coerce_value, OutboundMessage};
pub use request::{GroupInvitationRequest, NotificationRequest};
pub use response::{DeliveryResult, HealthStatus};

/// Shorten a device token for logs.
pub fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(20).collect();
    format!("{}...", prefix)
}
