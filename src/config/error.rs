//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Provider base URL must be http(s)")]
    InvalidProviderUrl,

    #[error("Provider timeout must be between 1 and 120 seconds")]
    InvalidProviderTimeout,

    #[error("Webhook signing secret must not be empty")]
    EmptySigningSecret,

    #[error("Webhook signing secret is required in production")]
    SigningSecretRequired,

    #[error("max_concurrency must be between 1 and {0}")]
    InvalidConcurrency(usize),

    #[error("check_timeout_secs must be between 1 and 120")]
    InvalidCheckTimeout,

    #[error("Operation log path must not be empty")]
    InvalidLogPath,
}
