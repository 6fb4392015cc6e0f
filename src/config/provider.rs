//! Validation provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::provider::HttpValidationConfig;

/// Validation provider configuration.
///
/// The API key is only needed by the scheduled job, so it is optional here
/// and enforced where the provider is built.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    pub api_key: Option<Secret<String>>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client configuration for the HTTP provider adapter.
    pub fn http_config(&self) -> Result<HttpValidationConfig, ValidationError> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
            .ok_or(ValidationError::MissingRequired("PROVIDER__API_KEY"))?;

        Ok(HttpValidationConfig::new(api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidProviderUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidProviderTimeout);
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8025".to_string()
}

fn default_timeout() -> u64 {
    10
}
