//! Monitor query handlers.
//!
//! Read-only handlers over contact status aggregates and the operation log.

mod get_operation_log;
mod get_validation_overview;

use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::ports::LogError;

pub use get_operation_log::{
    GetOperationLogHandler, GetOperationLogQuery, DEFAULT_LOG_LINES, MAX_LOG_LINES,
};
pub use get_validation_overview::{
    GetValidationOverviewHandler, GetValidationOverviewQuery, ValidationOverview,
};

/// Errors from monitor queries.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("store error: {0}")]
    Store(#[from] DomainError),

    #[error("operation log error: {0}")]
    Log(#[from] LogError),
}
