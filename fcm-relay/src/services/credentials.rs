//! Google service-account credentials.
//!
//! The JSON document is parsed and its RSA key loaded exactly once at
//! startup; a malformed document stops the process before it binds a port.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for the signed assertion; Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("service account key is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("service account key field `{0}` is empty")]
    MissingField(&'static str),

    #[error("service account private key is not a valid RSA PEM: {0}")]
    InvalidPrivateKey(#[from] jsonwebtoken::errors::Error),
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    project_id: String,
    client_email: String,
    private_key: Secret<String>,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub token_uri: String,
    key_id: Option<String>,
    encoding_key: EncodingKey,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    pub fn from_json(raw: &str) -> Result<Self, CredentialError> {
        let key: ServiceAccountKey = serde_json::from_str(raw)?;

        if key.project_id.trim().is_empty() {
            return Err(CredentialError::MissingField("project_id"));
        }
        if key.client_email.trim().is_empty() {
            return Err(CredentialError::MissingField("client_email"));
        }
        if key.private_key.expose_secret().trim().is_empty() {
            return Err(CredentialError::MissingField("private_key"));
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())?;

        Ok(Self {
            project_id: key.project_id,
            client_email: key.client_email,
            token_uri: key
                .token_uri
                .filter(|uri| !uri.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            key_id: key.private_key_id,
            encoding_key,
        })
    }

    /// Point the token exchange somewhere else (emulators, tests).
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    /// Signed JWT for the OAuth2 JWT-bearer grant.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: FCM_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        encode(&header, &claims, &self.encoding_key)
    }
}
