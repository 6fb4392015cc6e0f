//! Scheduled reconciliation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::handlers::RunReconciliationConfig;

/// Upper bound on concurrent provider checks.
const MAX_CONCURRENCY: usize = 64;

/// Reconciliation job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Deadline for a single provider call in seconds
    #[serde(default = "default_check_timeout")]
    pub check_timeout_secs: u64,

    /// Minimum spacing between provider calls in milliseconds
    #[serde(default)]
    pub min_request_interval_ms: u64,

    /// Overall run deadline used when the CLI does not pass one
    pub default_deadline_secs: Option<u64>,

    #[serde(default = "default_cas_retries")]
    pub cas_retries: u32,
}

impl ReconciliationConfig {
    /// Handler configuration for a run.
    pub fn run_config(&self) -> RunReconciliationConfig {
        RunReconciliationConfig {
            max_concurrency: self.max_concurrency,
            check_timeout: Duration::from_secs(self.check_timeout_secs),
            min_request_interval: Duration::from_millis(self.min_request_interval_ms),
            cas_retries: self.cas_retries,
        }
    }

    pub fn default_deadline(&self) -> Option<Duration> {
        self.default_deadline_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(ValidationError::InvalidConcurrency(MAX_CONCURRENCY));
        }
        if self.check_timeout_secs == 0 || self.check_timeout_secs > 120 {
            return Err(ValidationError::InvalidCheckTimeout);
        }
        Ok(())
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            check_timeout_secs: default_check_timeout(),
            min_request_interval_ms: 0,
            default_deadline_secs: None,
            cas_retries: default_cas_retries(),
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_check_timeout() -> u64 {
    10
}

fn default_cas_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_handler_defaults() {
        assert_eq!(
            ReconciliationConfig::default().run_config(),
            RunReconciliationConfig::default()
        );
    }

    #[test]
    fn test_run_config_converts_units() {
        let config = ReconciliationConfig {
            check_timeout_secs: 2,
            min_request_interval_ms: 250,
            ..Default::default()
        };
        let run = config.run_config();
        assert_eq!(run.check_timeout, Duration::from_secs(2));
        assert_eq!(run.min_request_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_default_deadline_is_optional() {
        assert!(ReconciliationConfig::default().default_deadline().is_none());

        let config = ReconciliationConfig {
            default_deadline_secs: Some(90),
            ..Default::default()
        };
        assert_eq!(config.default_deadline(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_validation_bounds() {
        let config = ReconciliationConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidConcurrency(64)));

        let config = ReconciliationConfig {
            check_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCheckTimeout));
    }
}
