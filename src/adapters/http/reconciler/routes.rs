//! Axum router configuration for reconciler endpoints.
//!
//! Webhook and monitor routes share one state; `app_router` mounts both and
//! wraps them in tracing and request timeout layers.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{get_log, get_overview, receive_delivery_webhook, ReconcilerAppState};

/// Create the webhook router.
///
/// # Routes
/// - `POST /delivery` - Delivery provider callbacks (signature verified when configured)
pub fn webhook_router() -> Router<ReconcilerAppState> {
    Router::new().route("/delivery", post(receive_delivery_webhook))
}

/// Create the read-only monitor router.
///
/// # Routes
/// - `GET /overview?list_id=<uuid>` - Status counts and lists with pending contacts
/// - `GET /log?lines=N` - Tail of the operation log
pub fn monitor_router() -> Router<ReconcilerAppState> {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/log", get(get_log))
}

/// Create the complete application router.
///
/// ```ignore
/// let app = app_router(state, Duration::from_secs(30));
/// axum::serve(listener, app).await?;
/// ```
pub fn app_router(state: ReconcilerAppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api/webhooks", webhook_router())
        .nest("/api/monitor", monitor_router())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
