pub mod fcm;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::OutboundMessage;

pub use fcm::FcmProvider;
pub use mock::MockPushProvider;

pub const INVALID_CREDENTIAL_CODE: &str = "app/invalid-credential";
pub const NETWORK_ERROR_CODE: &str = "app/network-error";

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The backend answered and refused the message.
    #[error("{message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl ProviderError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Opaque backend error code echoed to callers.
    pub fn code(&self) -> Option<&str> {
        match self {
            ProviderError::Rejected { code, .. } => code.as_deref(),
            ProviderError::Authentication(_) => Some(INVALID_CREDENTIAL_CODE),
            ProviderError::Connection(_) => Some(NETWORK_ERROR_CODE),
        }
    }
}

/// Push-delivery backend. `send` returns the backend-assigned message id.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Short label used in metrics.
    fn name(&self) -> &'static str;

    async fn send(&self, message: &OutboundMessage) -> Result<String, ProviderError>;
}
