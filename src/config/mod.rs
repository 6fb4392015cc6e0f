//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CONTACT_RECONCILER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use contact_reconciler::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod oplog;
mod provider;
mod reconciliation;
mod server;
mod webhook;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use oplog::OperationLogConfig;
pub use provider::ProviderConfig;
pub use reconciliation::ReconciliationConfig;
pub use server::{Environment, ServerConfig};
pub use webhook::WebhookConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Only `database.url` is required; every other section has defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Contact store (PostgreSQL)
    pub database: DatabaseConfig,

    /// Validation provider used by the scheduled job
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,

    #[serde(default)]
    pub reconciliation: ReconciliationConfig,

    #[serde(default)]
    pub oplog: OperationLogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CONTACT_RECONCILER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CONTACT_RECONCILER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CONTACT_RECONCILER__PROVIDER__API_KEY=...` -> `provider.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CONTACT_RECONCILER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.provider.validate()?;
        self.webhook.validate(&self.server.environment)?;
        self.reconciliation.validate()?;
        self.oplog.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "CONTACT_RECONCILER__DATABASE__URL",
        "CONTACT_RECONCILER__SERVER__PORT",
        "CONTACT_RECONCILER__SERVER__ENVIRONMENT",
        "CONTACT_RECONCILER__PROVIDER__API_KEY",
        "CONTACT_RECONCILER__WEBHOOK__SIGNING_SECRET",
        "CONTACT_RECONCILER__RECONCILIATION__MAX_CONCURRENCY",
        "CONTACT_RECONCILER__OPLOG__PATH",
    ];

    fn set_minimal_env() {
        env::set_var(
            "CONTACT_RECONCILER__DATABASE__URL",
            "postgresql://test@localhost/contacts",
        );
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/contacts");
        assert!(config.provider.api_key.is_none());
        assert!(config.webhook.signing_secret.is_none());
    }

    #[test]
    fn test_minimal_config_validates() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CONTACT_RECONCILER__SERVER__PORT", "3000");
        env::set_var("CONTACT_RECONCILER__RECONCILIATION__MAX_CONCURRENCY", "2");
        env::set_var("CONTACT_RECONCILER__OPLOG__PATH", "/tmp/recon.log");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.reconciliation.max_concurrency, 2);
        assert_eq!(config.oplog.path, std::path::PathBuf::from("/tmp/recon.log"));
    }

    #[test]
    fn test_production_without_signing_secret_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CONTACT_RECONCILER__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::SigningSecretRequired));
    }

    #[test]
    fn test_production_with_signing_secret_validates() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CONTACT_RECONCILER__SERVER__ENVIRONMENT", "production");
        env::set_var("CONTACT_RECONCILER__WEBHOOK__SIGNING_SECRET", "s3cret");
        env::set_var("CONTACT_RECONCILER__PROVIDER__API_KEY", "key-1");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert!(config.provider.http_config().is_ok());
    }

    #[test]
    fn test_missing_database_url_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
