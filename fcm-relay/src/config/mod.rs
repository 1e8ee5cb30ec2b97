use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_FCM_API_URL: &str = "https://fcm.googleapis.com";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub fcm: FcmConfig,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    /// Google service-account JSON document, verbatim.
    pub service_account_key: Secret<String>,
    /// Base URL of the FCM HTTP v1 API. Overridable for emulators and tests.
    pub api_url: String,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(RelayConfig {
            common,
            fcm: FcmConfig {
                service_account_key: Secret::new(require(
                    &lookup,
                    "FIREBASE_SERVICE_ACCOUNT_KEY",
                )?),
                api_url: lookup("FCM_API_URL")
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FCM_API_URL.to_string()),
            },
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} environment variable is not set",
            key
        ))),
    }
}
