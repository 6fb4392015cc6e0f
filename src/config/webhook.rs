//! Webhook configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::validation::WebhookVerifier;

/// Delivery webhook configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret for `X-Webhook-Signature`. Unsigned callbacks are
    /// accepted when unset.
    pub signing_secret: Option<Secret<String>>,
}

impl WebhookConfig {
    /// Verifier for incoming callbacks, if signing is configured.
    pub fn verifier(&self) -> Option<WebhookVerifier> {
        self.signing_secret.clone().map(WebhookVerifier::new)
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        match &self.signing_secret {
            Some(secret) if secret.expose_secret().is_empty() => {
                Err(ValidationError::EmptySigningSecret)
            }
            None if *environment == Environment::Production => {
                Err(ValidationError::SigningSecretRequired)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_allowed_outside_production() {
        let config = WebhookConfig::default();
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.verifier().is_none());
    }

    #[test]
    fn test_production_requires_secret() {
        assert_eq!(
            WebhookConfig::default().validate(&Environment::Production),
            Err(ValidationError::SigningSecretRequired)
        );
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = WebhookConfig {
            signing_secret: Some(Secret::new(String::new())),
        };
        assert_eq!(
            config.validate(&Environment::Staging),
            Err(ValidationError::EmptySigningSecret)
        );
    }

    #[test]
    fn test_secret_builds_verifier() {
        let config = WebhookConfig {
            signing_secret: Some(Secret::new("whsec".to_string())),
        };
        assert!(config.validate(&Environment::Production).is_ok());
        assert!(config.verifier().is_some());
    }
}
