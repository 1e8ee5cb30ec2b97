use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::DeliveryResult;
use crate::services::{classify, FailureKind, ProviderError};

pub const DEFAULT_DELIVERY_ERROR: &str = "Failed to send notification";

/// Per-request failures. Each one becomes a JSON body with `success: false`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    #[error("Invalid registration token")]
    InvalidToken { code: String },

    #[error("{message}")]
    DeliveryFailure {
        message: String,
        code: Option<String>,
    },
}

impl RelayError {
    pub fn from_provider(err: &ProviderError) -> Self {
        match (classify(err.code()), err.code()) {
            (FailureKind::InvalidToken, Some(code)) => RelayError::InvalidToken {
                code: code.to_string(),
            },
            (_, code) => {
                let message = err.to_string();
                RelayError::DeliveryFailure {
                    message: if message.is_empty() {
                        DEFAULT_DELIVERY_ERROR.to_string()
                    } else {
                        message
                    },
                    code: code.map(str::to_string),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingFields(_) | RelayError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            RelayError::InvalidToken { .. } => FailureKind::InvalidToken.status(),
            RelayError::DeliveryFailure { .. } => FailureKind::DeliveryFailure.status(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            RelayError::InvalidToken { code } => Some(code),
            RelayError::DeliveryFailure { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        RelayError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = DeliveryResult::failed(self.to_string(), self.code().map(str::to_string));
        (status, Json(body)).into_response()
    }
}
