//! Reconciler HTTP adapter module.
//!
//! Exposes the delivery webhook and the read-only monitor endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, LogTailResponse, WebhookAckResponse};
pub use handlers::{MonitorApiError, ReconcilerAppState, WebhookApiError};
pub use routes::{app_router, monitor_router, webhook_router};
