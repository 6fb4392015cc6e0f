//! HTTP handlers for webhook ingestion and monitor endpoints.
//!
//! These handlers connect Axum routes to application layer handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tracing::error;

use crate::application::handlers::{
    GetOperationLogHandler, GetOperationLogQuery, GetValidationOverviewHandler,
    GetValidationOverviewQuery, IngestWebhookCommand, IngestWebhookHandler, MonitorError,
    ValidationOverview, DEFAULT_CAS_RETRIES,
};
use crate::domain::foundation::ListId;
use crate::domain::validation::{WebhookError, WebhookVerifier, SIGNATURE_HEADER};
use crate::ports::{ContactReader, ContactStore, OperationLog};

use super::dto::{ErrorResponse, LogParams, LogTailResponse, OverviewParams, WebhookAckResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing reconciler dependencies.
#[derive(Clone)]
pub struct ReconcilerAppState {
    pub contact_store: Arc<dyn ContactStore>,
    pub contact_reader: Arc<dyn ContactReader>,
    pub operation_log: Arc<dyn OperationLog>,
    /// When set, every callback must carry a valid signature.
    pub webhook_verifier: Option<Arc<WebhookVerifier>>,
    pub cas_retries: u32,
}

impl ReconcilerAppState {
    pub fn new(
        contact_store: Arc<dyn ContactStore>,
        contact_reader: Arc<dyn ContactReader>,
        operation_log: Arc<dyn OperationLog>,
    ) -> Self {
        Self {
            contact_store,
            contact_reader,
            operation_log,
            webhook_verifier: None,
            cas_retries: DEFAULT_CAS_RETRIES,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<WebhookVerifier>) -> Self {
        self.webhook_verifier = Some(verifier);
        self
    }

    pub fn with_cas_retries(mut self, cas_retries: u32) -> Self {
        self.cas_retries = cas_retries;
        self
    }

    pub fn ingest_webhook_handler(&self) -> IngestWebhookHandler {
        let handler =
            IngestWebhookHandler::new(self.contact_store.clone(), self.operation_log.clone())
                .with_cas_retries(self.cas_retries);
        match &self.webhook_verifier {
            Some(verifier) => handler.with_verifier(verifier.clone()),
            None => handler,
        }
    }

    pub fn overview_handler(&self) -> GetValidationOverviewHandler {
        GetValidationOverviewHandler::new(self.contact_reader.clone())
    }

    pub fn operation_log_handler(&self) -> GetOperationLogHandler {
        GetOperationLogHandler::new(self.operation_log.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/delivery
///
/// Ingests one delivery provider callback. Business outcomes are always 200.
pub async fn receive_delivery_webhook(
    State(state): State<ReconcilerAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAckResponse>, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = IngestWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let result = state.ingest_webhook_handler().handle(cmd).await?;
    Ok(Json(WebhookAckResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Monitor Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/monitor/overview
///
/// Returns status counts and the lists that still have pending contacts.
pub async fn get_overview(
    State(state): State<ReconcilerAppState>,
    Query(params): Query<OverviewParams>,
) -> Result<Json<ValidationOverview>, MonitorApiError> {
    let list_id = match params.list_id.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<ListId>()
                .map_err(|_| MonitorApiError::BadRequest(format!("Invalid list ID: {}", raw)))?,
        ),
    };

    let overview = state
        .overview_handler()
        .handle(GetValidationOverviewQuery { list_id })
        .await?;
    Ok(Json(overview))
}

/// GET /api/monitor/log?lines=N
///
/// Returns the most recent operation log entries, oldest first.
pub async fn get_log(
    State(state): State<ReconcilerAppState>,
    Query(params): Query<LogParams>,
) -> Result<Json<LogTailResponse>, MonitorApiError> {
    let entries = state
        .operation_log_handler()
        .handle(GetOperationLogQuery {
            lines: params.lines,
        })
        .await?;
    Ok(Json(LogTailResponse::from(entries)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
///
/// 4xx tells the provider to stop retrying; 5xx asks it to retry later.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "Webhook processing failed");
        }

        let body = if self.0.is_retryable() {
            ErrorResponse::with_details(
                self.0.error_code(),
                self.0.to_string(),
                serde_json::json!({ "retryable": true }),
            )
        } else {
            ErrorResponse::new(self.0.error_code(), self.0.to_string())
        };
        (status, Json(body)).into_response()
    }
}

/// Monitor API error that implements IntoResponse.
pub enum MonitorApiError {
    BadRequest(String),
    Internal(MonitorError),
}

impl From<MonitorError> for MonitorApiError {
    fn from(err: MonitorError) -> Self {
        MonitorApiError::Internal(err)
    }
}

impl IntoResponse for MonitorApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            MonitorApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("BAD_REQUEST", msg))
            }
            MonitorApiError::Internal(err) => {
                error!(error = %err, "Monitor query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", err.to_string()),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
