//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Validation commands
    CancellationSignal, IngestResult, IngestWebhookCommand, IngestWebhookHandler,
    ReconciliationError, RunOutcome, RunReconciliationConfig, RunReconciliationHandler,
    RunReport, RunScope, SkipReason,
    // Monitor queries
    GetOperationLogHandler, GetOperationLogQuery, GetValidationOverviewHandler,
    GetValidationOverviewQuery, MonitorError, ValidationOverview,
};
