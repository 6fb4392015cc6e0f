//! Webhook error types for delivery provider callbacks.
//!
//! Business outcomes (unsupported type, unknown recipient, duplicate) are not
//! errors; they are acknowledged as skipped. Only transport, parse and store
//! failures end up here, with HTTP status mapping that drives the provider's
//! retry behavior.

use axum::http::StatusCode;
use thiserror::Error;

use super::NormalizationError;
use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header missing while a signing secret is configured.
    #[error("Missing signature")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp is older than the acceptance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Body or signature header could not be parsed.
    #[error("Parse error: {0}")]
    BadRequest(String),

    /// Body parsed but a required field is missing or invalid.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The contact store could not be read or written.
    #[error("Store write failed: {0}")]
    StoreWriteFailed(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::StoreWriteFailed(_))
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 4xx: the payload will never succeed, provider stops retrying
    /// - 5xx: provider retries later
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange => StatusCode::UNAUTHORIZED,

            WebhookError::InvalidTimestamp
            | WebhookError::BadRequest(_)
            | WebhookError::MalformedEvent(_) => StatusCode::BAD_REQUEST,

            WebhookError::StoreWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for error response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::TimestampOutOfRange => "TIMESTAMP_OUT_OF_RANGE",
            WebhookError::InvalidTimestamp => "INVALID_TIMESTAMP",
            WebhookError::BadRequest(_) => "BAD_REQUEST",
            WebhookError::MalformedEvent(_) => "MALFORMED_EVENT",
            WebhookError::StoreWriteFailed(_) => "STORE_WRITE_FAILED",
        }
    }
}

impl From<NormalizationError> for WebhookError {
    fn from(err: NormalizationError) -> Self {
        match err {
            NormalizationError::MalformedEvent(reason) => WebhookError::MalformedEvent(reason),
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::StoreWriteFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(format!("{}", WebhookError::InvalidSignature), "Invalid signature");
    }

    #[test]
    fn bad_request_displays_message() {
        let err = WebhookError::BadRequest("expected value at line 1".to_string());
        assert_eq!(format!("{}", err), "Parse error: expected value at line 1");
    }

    #[test]
    fn signature_failures_map_to_401() {
        assert_eq!(WebhookError::MissingSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebhookError::InvalidSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            WebhookError::TimestampOutOfRange.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn payload_failures_map_to_400() {
        assert_eq!(
            WebhookError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MalformedEvent("missing Recipient".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_failure_maps_to_500_and_is_retryable() {
        let err = WebhookError::StoreWriteFailed("connection refused".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_retryable());
    }

    #[test]
    fn payload_failures_are_not_retryable() {
        assert!(!WebhookError::BadRequest("x".into()).is_retryable());
        assert!(!WebhookError::MalformedEvent("x".into()).is_retryable());
        assert!(!WebhookError::InvalidSignature.is_retryable());
    }

    #[test]
    fn normalization_error_converts_to_malformed_event() {
        let err: WebhookError =
            NormalizationError::MalformedEvent("missing MessageID".to_string()).into();
        assert!(matches!(err, WebhookError::MalformedEvent(ref r) if r == "missing MessageID"));
    }

    #[test]
    fn domain_error_converts_to_store_write_failed() {
        let err: WebhookError = DomainError::database("pool timed out").into();
        assert!(matches!(err, WebhookError::StoreWriteFailed(_)));
    }
}
