//! Event normalizer - maps provider webhook records to validation events.
//!
//! | record type   | cause      | status  |
//! |---------------|------------|---------|
//! | Open          | opened     | valid   |
//! | Delivery      | delivered  | valid   |
//! | Bounce        | bounced    | invalid |
//! | SpamComplaint | complained | invalid |
//!
//! Any other record type is reported as unsupported, which callers
//! acknowledge without touching the store.

use thiserror::Error;

use super::{
    ContactReference, EmailStatus, ProviderEvent, ProviderRecordType, ValidationCause,
    ValidationEvent,
};
use crate::domain::foundation::{EmailAddress, ListId, Timestamp};

/// Metadata key that restricts an event to one list.
pub const LIST_ID_METADATA_KEY: &str = "list_id";

/// How far past `received_at` a record timestamp may lie before it is
/// replaced by `received_at`.
pub const MAX_OBSERVED_SKEW_SECS: i64 = 60;

/// Result of normalizing one provider record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedEvent {
    Supported(ValidationEvent),
    Unsupported { record_type: String },
}

/// The payload parsed but lacks a field every supported record needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
}

impl NormalizationError {
    fn malformed(reason: impl Into<String>) -> Self {
        NormalizationError::MalformedEvent(reason.into())
    }
}

/// Normalizes a provider record.
///
/// `received_at` is used as `observed_at` when the record carries no usable
/// timestamp of its own, or one more than [`MAX_OBSERVED_SKEW_SECS`] in the
/// future.
pub fn normalize(
    raw: &ProviderEvent,
    received_at: Timestamp,
) -> Result<NormalizedEvent, NormalizationError> {
    let record_type = raw
        .record_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NormalizationError::malformed("missing RecordType"))?;

    let (cause, observed_status, event_time) = match ProviderRecordType::from_str(record_type) {
        ProviderRecordType::Open => (
            ValidationCause::Opened,
            EmailStatus::Valid,
            raw.received_at.as_deref(),
        ),
        ProviderRecordType::Delivery => (
            ValidationCause::Delivered,
            EmailStatus::Valid,
            raw.delivered_at.as_deref(),
        ),
        ProviderRecordType::Bounce => (
            ValidationCause::Bounced,
            EmailStatus::Invalid,
            raw.bounced_at.as_deref(),
        ),
        ProviderRecordType::SpamComplaint => (
            ValidationCause::Complained,
            EmailStatus::Invalid,
            raw.bounced_at.as_deref(),
        ),
        ProviderRecordType::Unsupported(record_type) => {
            return Ok(NormalizedEvent::Unsupported { record_type });
        }
    };

    let recipient = raw
        .recipient_address()
        .ok_or_else(|| NormalizationError::malformed("missing Recipient"))?;
    let email = EmailAddress::new(recipient)
        .map_err(|e| NormalizationError::malformed(format!("invalid Recipient: {}", e)))?;

    let correlation_token = raw
        .message_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NormalizationError::malformed("missing MessageID"))?
        .to_string();

    // Metadata that is not a list UUID belongs to someone else; ignore it.
    let list_id = raw
        .metadata_str(LIST_ID_METADATA_KEY)
        .and_then(|s| s.parse::<ListId>().ok());

    let latest_trusted = received_at.plus_secs(MAX_OBSERVED_SKEW_SECS);
    let observed_at = match event_time.and_then(Timestamp::parse_rfc3339) {
        Some(at) if !at.is_after(&latest_trusted) => at,
        _ => received_at,
    };

    Ok(NormalizedEvent::Supported(ValidationEvent {
        contact: ContactReference::Address { email, list_id },
        correlation_token,
        observed_status,
        cause,
        observed_at,
    }))
}
