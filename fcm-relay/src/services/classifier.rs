use axum::http::StatusCode;

/// How a backend failure is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The recipient token is permanently unusable; the caller should drop it.
    InvalidToken,
    /// Anything else. May be transient.
    DeliveryFailure,
}

impl FailureKind {
    pub fn status(self) -> StatusCode {
        match self {
            FailureKind::InvalidToken => StatusCode::BAD_REQUEST,
            FailureKind::DeliveryFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Classify a backend error code. The `messaging/` namespace is optional.
pub fn classify(code: Option<&str>) -> FailureKind {
    let Some(code) = code else {
        return FailureKind::DeliveryFailure;
    };

    match code.strip_prefix("messaging/").unwrap_or(code) {
        "invalid-registration-token" | "registration-token-not-registered" => {
            FailureKind::InvalidToken
        }
        _ => FailureKind::DeliveryFailure,
    }
}
