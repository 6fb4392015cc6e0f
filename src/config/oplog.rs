//! Operation log configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the JSON-lines operation log is written.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationLogConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl OperationLogConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidLogPath);
        }
        Ok(())
    }
}

impl Default for OperationLogConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./data/reconciliation.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let config = OperationLogConfig::default();
        assert!(config.path.ends_with("reconciliation.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_path_rejected() {
        let config = OperationLogConfig {
            path: PathBuf::new(),
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidLogPath));
    }
}
