//! HTTP adapters - REST API implementations.

pub mod reconciler;

pub use reconciler::{app_router, monitor_router, webhook_router, ReconcilerAppState};
