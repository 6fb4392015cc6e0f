//! Deliverability verdicts returned by the provider's single-address query.

use serde::{Deserialize, Serialize};

use super::{ContactReference, EmailStatus, ValidationCause, ValidationEvent};
use crate::domain::foundation::{ContactId, Timestamp};

/// The provider's classification of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deliverability {
    Deliverable,
    Undeliverable,
    /// Unknown, risky or otherwise non-committal. Contact stays pending.
    Inconclusive,
}

impl Deliverability {
    /// Parses the provider's verdict string.
    ///
    /// Only explicit verdicts resolve a contact; catch-all style answers
    /// ("Risky", "Unknown") and unrecognized values are inconclusive.
    pub fn from_provider(verdict: &str) -> Self {
        match verdict.trim().to_lowercase().as_str() {
            "deliverable" | "valid" => Deliverability::Deliverable,
            "undeliverable" | "invalid" => Deliverability::Undeliverable,
            _ => Deliverability::Inconclusive,
        }
    }
}

/// Suggested fix for a likely typo (e.g. `gmial.com`). Passed through to
/// callers; never used in transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedCorrection {
    pub contact_id: ContactId,
    pub suggestion: String,
}

/// Builds the validation event for a scheduled check.
///
/// Returns `None` for inconclusive verdicts so the contact is left untouched.
pub fn scheduled_check_event(
    contact_id: ContactId,
    deliverability: Deliverability,
    query_id: impl Into<String>,
    now: Timestamp,
) -> Option<ValidationEvent> {
    let (observed_status, cause) = match deliverability {
        Deliverability::Deliverable => (EmailStatus::Valid, ValidationCause::CheckedDeliverable),
        Deliverability::Undeliverable => {
            (EmailStatus::Invalid, ValidationCause::CheckedUndeliverable)
        }
        Deliverability::Inconclusive => return None,
    };

    Some(ValidationEvent {
        contact: ContactReference::Contact(contact_id),
        correlation_token: query_id.into(),
        observed_status,
        cause,
        observed_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_verdicts() {
        assert_eq!(
            Deliverability::from_provider("Deliverable"),
            Deliverability::Deliverable
        );
        assert_eq!(
            Deliverability::from_provider("UNDELIVERABLE"),
            Deliverability::Undeliverable
        );
        assert_eq!(
            Deliverability::from_provider("Risky"),
            Deliverability::Inconclusive
        );
        assert_eq!(Deliverability::from_provider(""), Deliverability::Inconclusive);
    }

    #[test]
    fn deliverable_maps_to_valid_checked_deliverable() {
        let id = ContactId::new();
        let now = Timestamp::now();

        let event = scheduled_check_event(id, Deliverability::Deliverable, "q-1", now).unwrap();

        assert_eq!(event.contact, ContactReference::Contact(id));
        assert_eq!(event.observed_status, EmailStatus::Valid);
        assert_eq!(event.cause, ValidationCause::CheckedDeliverable);
        assert_eq!(event.correlation_token, "q-1");
        assert_eq!(event.observed_at, now);
    }

    #[test]
    fn undeliverable_maps_to_invalid_checked_undeliverable() {
        let event = scheduled_check_event(
            ContactId::new(),
            Deliverability::Undeliverable,
            "q-2",
            Timestamp::now(),
        )
        .unwrap();

        assert_eq!(event.observed_status, EmailStatus::Invalid);
        assert_eq!(event.cause, ValidationCause::CheckedUndeliverable);
    }

    #[test]
    fn inconclusive_produces_no_event() {
        let event = scheduled_check_event(
            ContactId::new(),
            Deliverability::Inconclusive,
            "q-3",
            Timestamp::now(),
        );
        assert!(event.is_none());
    }
}
