use super::{ProviderError, PushProvider};
use crate::config::FcmConfig;
use crate::models::{token_prefix, OutboundMessage};
use crate::services::credentials::{CredentialError, ServiceAccount};
use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const FCM_ERROR_TYPE: &str = "type.googleapis.com/google.firebase.fcm.v1.FcmError";

/// Refresh this long before Google says the access token expires.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Firebase Cloud Messaging over the HTTP v1 API.
///
/// One instance is built at startup and shared by every request. OAuth2
/// access tokens are minted from the service account and cached until shortly
/// before they expire.
pub struct FcmProvider {
    account: ServiceAccount,
    api_url: String,
    client: Client,
    access_token: RwLock<Option<AccessToken>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: &'a OutboundMessage,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FcmErrorEnvelope {
    error: FcmErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct FcmErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct FcmErrorDetail {
    #[serde(rename = "@type", default)]
    type_url: String,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl FcmProvider {
    pub fn new(config: &FcmConfig) -> Result<Self, CredentialError> {
        let account = ServiceAccount::from_json(config.service_account_key.expose_secret())?;
        Ok(Self::with_account(account, &config.api_url))
    }

    pub fn with_account(account: ServiceAccount, api_url: &str) -> Self {
        Self {
            account,
            api_url: api_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            access_token: RwLock::new(None),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    async fn access_token(&self) -> Result<String, ProviderError> {
        {
            let cached = self.access_token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                return Ok(token.value.clone());
            }
        }

        let mut cached = self.access_token.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_access_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_access_token(&self) -> Result<AccessToken, ProviderError> {
        let assertion = self.account.assertion(Utc::now()).map_err(|e| {
            ProviderError::Authentication(format!("Failed to sign token assertion: {}", e))
        })?;

        let response = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                ProviderError::Connection(format!("Failed to reach token endpoint: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Authentication(format!(
                "Token endpoint returned error status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ProviderError::Authentication(format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!(
            client_email = %self.account.client_email,
            expires_in = token.expires_in,
            "Obtained FCM access token"
        );

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl PushProvider for FcmProvider {
    fn name(&self) -> &'static str {
        "fcm"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<String, ProviderError> {
        let access_token = self.access_token().await?;

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.api_url, self.account.project_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&FcmRequest { message })
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to connect to FCM: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(translate_error(status.as_u16(), &body));
        }

        let sent: FcmResponse = response.json().await.map_err(|e| {
            ProviderError::rejected(
                "messaging/unknown-error",
                format!("Failed to parse FCM response: {}", e),
            )
        })?;

        tracing::debug!(
            token = %token_prefix(&message.token),
            message_id = %sent.name,
            "FCM accepted message"
        );

        Ok(sent.name)
    }
}

/// Turn an FCM v1 error response into a `messaging/*` code plus message.
fn translate_error(http_status: u16, body: &str) -> ProviderError {
    let (error, parsed) = match serde_json::from_str::<FcmErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error, true),
        Err(_) => (FcmErrorBody::default(), false),
    };

    let fcm_code = error
        .details
        .iter()
        .find(|d| d.type_url == FCM_ERROR_TYPE && d.error_code.is_some())
        .and_then(|d| d.error_code.as_deref());

    let code = match fcm_code {
        Some(fcm_code) => messaging_code(fcm_code, &error.message),
        None if !error.status.is_empty() => status_code(&error.status, &error.message),
        None => http_code(http_status),
    };

    let message = if parsed && !error.message.is_empty() {
        error.message
    } else {
        format!(
            "FCM API returned error status {}: {}",
            StatusCode::from_u16(http_status)
                .map(|s| s.to_string())
                .unwrap_or_else(|_| http_status.to_string()),
            body
        )
    };

    ProviderError::rejected(code, message)
}

fn messaging_code(fcm_code: &str, message: &str) -> &'static str {
    match fcm_code {
        "UNREGISTERED" => "messaging/registration-token-not-registered",
        "INVALID_ARGUMENT" => invalid_argument_code(message),
        "SENDER_ID_MISMATCH" => "messaging/mismatched-credential",
        "QUOTA_EXCEEDED" => "messaging/message-rate-exceeded",
        "UNAVAILABLE" => "messaging/server-unavailable",
        "INTERNAL" => "messaging/internal-error",
        "THIRD_PARTY_AUTH_ERROR" | "APNS_AUTH_ERROR" => "messaging/third-party-auth-error",
        _ => "messaging/unknown-error",
    }
}

fn status_code(status: &str, message: &str) -> &'static str {
    match status {
        "INVALID_ARGUMENT" => invalid_argument_code(message),
        "NOT_FOUND" => "messaging/registration-token-not-registered",
        "UNAUTHENTICATED" | "PERMISSION_DENIED" => "messaging/authentication-error",
        "RESOURCE_EXHAUSTED" => "messaging/message-rate-exceeded",
        "UNAVAILABLE" => "messaging/server-unavailable",
        "INTERNAL" => "messaging/internal-error",
        _ => "messaging/unknown-error",
    }
}

fn http_code(http_status: u16) -> &'static str {
    match http_status {
        400 => "messaging/invalid-argument",
        401 | 403 => "messaging/authentication-error",
        404 => "messaging/registration-token-not-registered",
        429 => "messaging/message-rate-exceeded",
        500 => "messaging/internal-error",
        503 => "messaging/server-unavailable",
        _ => "messaging/unknown-error",
    }
}

fn invalid_argument_code(message: &str) -> &'static str {
    if message.to_lowercase().contains("registration token") {
        "messaging/invalid-registration-token"
    } else {
        "messaging/invalid-argument"
    }
}
