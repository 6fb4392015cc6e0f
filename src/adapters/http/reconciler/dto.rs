//! Data Transfer Objects for the reconciler HTTP API.
//!
//! These types define the JSON shapes for webhook acknowledgements and
//! monitor responses, decoupled from domain types.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{IngestResult, SkipReason};
use crate::domain::foundation::ContactId;
use crate::domain::validation::{EmailStatus, ValidationCause};
use crate::ports::OperationLogEntry;

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned to the delivery provider for every business outcome.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    /// `success`, `skipped` or `contact_not_found`.
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contact_ids: Vec<ContactId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_status: Option<EmailStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_event: Option<ValidationCause>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
}

impl From<IngestResult> for WebhookAckResponse {
    fn from(result: IngestResult) -> Self {
        match result {
            IngestResult::Applied {
                contact_ids,
                status,
                event,
            } => Self {
                status: "success".to_string(),
                reason: None,
                contact_ids,
                email_status: Some(status),
                email_event: Some(event),
                correlation_token: None,
            },
            IngestResult::Skipped {
                reason,
                correlation_token,
            } => {
                let status = match reason {
                    SkipReason::ContactNotFound => "contact_not_found",
                    _ => "skipped",
                };
                Self {
                    status: status.to_string(),
                    reason: Some(reason.as_str().to_string()),
                    contact_ids: Vec::new(),
                    email_status: None,
                    email_event: None,
                    correlation_token,
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Monitor Requests / Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Query parameters for `GET /api/monitor/overview`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewParams {
    /// Restrict counts to one list (UUID).
    pub list_id: Option<String>,
}

/// Query parameters for `GET /api/monitor/log`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogParams {
    pub lines: Option<usize>,
}

/// Tail of the operation log, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct LogTailResponse {
    pub count: usize,
    pub entries: Vec<OperationLogEntry>,
}

impl From<Vec<OperationLogEntry>> for LogTailResponse {
    fn from(entries: Vec<OperationLogEntry>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            error: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            error: message.into(),
            details: Some(details),
        }
    }
}
