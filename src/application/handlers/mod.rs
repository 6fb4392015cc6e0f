//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod monitor;
pub mod validation;

pub use monitor::{
    GetOperationLogHandler, GetOperationLogQuery, GetValidationOverviewHandler,
    GetValidationOverviewQuery, MonitorError, ValidationOverview,
};
pub use validation::{
    CancellationSignal, IngestResult, IngestWebhookCommand, IngestWebhookHandler,
    ReconciliationError, RunOutcome, RunReconciliationConfig, RunReconciliationHandler,
    RunReport, RunScope, SkipReason, DEFAULT_CAS_RETRIES,
};
