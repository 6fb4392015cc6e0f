//! Validation command handlers.
//!
//! Both producers of status changes live here: webhook ingestion and the
//! scheduled reconciliation run. They share the conditional update loop in
//! `apply_transition`.

mod apply_transition;
mod cancellation;
mod ingest_webhook;
mod run_reconciliation;

pub use apply_transition::{apply_transition, ApplyOutcome};
pub use cancellation::CancellationSignal;
pub use ingest_webhook::{
    IngestResult, IngestWebhookCommand, IngestWebhookHandler, SkipReason, DEFAULT_CAS_RETRIES,
};
pub use run_reconciliation::{
    ReconciliationError, RunOutcome, RunReconciliationConfig, RunReconciliationHandler,
    RunReport, RunScope,
};
