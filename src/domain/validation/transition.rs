//! Transition rules shared by webhook ingestion and scheduled checks.
//!
//! Resolved statuses are last-writer-wins by `observed_at`, not by arrival
//! order. A token equal to the stored `validation_message` is a redelivery
//! and never mutates the contact.

use thiserror::Error;

use super::{ContactStatusView, ValidationEvent, ValidationUpdate};
use crate::domain::foundation::{StateMachine, Timestamp};

/// Why an event was not applied to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejected {
    /// The contact already carries this correlation token.
    #[error("duplicate correlation token")]
    Duplicate,

    /// The contact is resolved by evidence newer than this event.
    #[error("stale event observed at {observed_at:?}, contact updated at {current:?}")]
    Stale {
        observed_at: Timestamp,
        current: Timestamp,
    },

    /// The status change is not a legal edge of the status machine.
    #[error("illegal status change: {0}")]
    Illegal(String),
}

impl TransitionRejected {
    /// Short reason recorded in the operational log.
    pub fn reason(&self) -> &'static str {
        match self {
            TransitionRejected::Duplicate => "duplicate",
            TransitionRejected::Stale { .. } => "stale",
            TransitionRejected::Illegal(_) => "illegal_transition",
        }
    }
}

/// Decides whether `event` applies to a contact in state `current`.
pub fn transition(
    current: &ContactStatusView,
    event: &ValidationEvent,
) -> Result<ValidationUpdate, TransitionRejected> {
    if current.validation_message.as_deref() == Some(event.correlation_token.as_str()) {
        return Err(TransitionRejected::Duplicate);
    }

    if current.email_status.is_resolved() {
        if let Some(current_date) = current.validation_date {
            if event.observed_at.is_before(&current_date) {
                return Err(TransitionRejected::Stale {
                    observed_at: event.observed_at,
                    current: current_date,
                });
            }
        }
    }

    let email_status = current
        .email_status
        .transition_to(event.observed_status)
        .map_err(|e| TransitionRejected::Illegal(e.to_string()))?;

    Ok(ValidationUpdate {
        email_status,
        email_event: event.cause.clone(),
        validation_message: event.correlation_token.clone(),
        validation_date: event.observed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ContactId, EmailAddress};
    use crate::domain::validation::{ContactReference, EmailStatus, ValidationCause};
    use proptest::prelude::*;

    fn pending() -> ContactStatusView {
        ContactStatusView {
            email_status: EmailStatus::Pending,
            validation_message: None,
            validation_date: None,
        }
    }

    fn resolved(status: EmailStatus, token: &str, at: Timestamp) -> ContactStatusView {
        ContactStatusView {
            email_status: status,
            validation_message: Some(token.to_string()),
            validation_date: Some(at),
        }
    }

    fn event(status: EmailStatus, cause: ValidationCause, token: &str, at: Timestamp) -> ValidationEvent {
        ValidationEvent {
            contact: ContactReference::Address {
                email: EmailAddress::new("c1@example.com").unwrap(),
                list_id: None,
            },
            correlation_token: token.to_string(),
            observed_status: status,
            cause,
            observed_at: at,
        }
    }

    #[test]
    fn bounce_resolves_pending_contact_to_invalid() {
        let at = Timestamp::now();
        let update = transition(
            &pending(),
            &event(EmailStatus::Invalid, ValidationCause::Bounced, "m1", at),
        )
        .unwrap();

        assert_eq!(update.email_status, EmailStatus::Invalid);
        assert_eq!(update.email_event, ValidationCause::Bounced);
        assert_eq!(update.validation_message, "m1");
        assert_eq!(update.validation_date, at);
    }

    #[test]
    fn same_token_is_rejected_as_duplicate() {
        let at = Timestamp::now();
        let current = resolved(EmailStatus::Invalid, "m1", at);

        let result = transition(
            &current,
            &event(EmailStatus::Invalid, ValidationCause::Bounced, "m1", at),
        );

        assert_eq!(result, Err(TransitionRejected::Duplicate));
    }

    #[test]
    fn duplicate_check_applies_to_pending_contacts_with_token() {
        let mut current = pending();
        current.validation_message = Some("m1".to_string());

        let result = transition(
            &current,
            &event(EmailStatus::Valid, ValidationCause::Opened, "m1", Timestamp::now()),
        );

        assert_eq!(result, Err(TransitionRejected::Duplicate));
    }

    #[test]
    fn late_bounce_overrides_open() {
        let opened_at = Timestamp::now().minus_minutes(10);
        let current = resolved(EmailStatus::Valid, "m1", opened_at);

        let update = transition(
            &current,
            &event(EmailStatus::Invalid, ValidationCause::Bounced, "m2", Timestamp::now()),
        )
        .unwrap();

        assert_eq!(update.email_status, EmailStatus::Invalid);
    }

    #[test]
    fn older_evidence_is_stale_for_resolved_contact() {
        let now = Timestamp::now();
        let current = resolved(EmailStatus::Invalid, "m2", now);

        let result = transition(
            &current,
            &event(EmailStatus::Valid, ValidationCause::Opened, "m1", now.minus_minutes(5)),
        );

        assert!(matches!(result, Err(TransitionRejected::Stale { .. })));
    }

    #[test]
    fn equal_timestamp_is_accepted() {
        let now = Timestamp::now();
        let current = resolved(EmailStatus::Valid, "m1", now);

        let result = transition(
            &current,
            &event(EmailStatus::Invalid, ValidationCause::Complained, "m2", now),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn pending_contact_accepts_old_evidence() {
        let mut current = pending();
        current.validation_date = Some(Timestamp::now());

        let result = transition(
            &current,
            &event(
                EmailStatus::Valid,
                ValidationCause::Delivered,
                "m1",
                Timestamp::now().minus_minutes(60),
            ),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn pending_observation_is_illegal() {
        let result = transition(
            &pending(),
            &event(
                EmailStatus::Pending,
                ValidationCause::Other("unknown".to_string()),
                "m1",
                Timestamp::now(),
            ),
        );

        assert!(matches!(result, Err(TransitionRejected::Illegal(_))));
    }

    #[test]
    fn rejection_reasons_are_stable() {
        assert_eq!(TransitionRejected::Duplicate.reason(), "duplicate");
        let now = Timestamp::now();
        assert_eq!(
            TransitionRejected::Stale { observed_at: now, current: now }.reason(),
            "stale"
        );
    }

    #[test]
    fn scheduled_event_uses_contact_reference() {
        let id = ContactId::new();
        let mut e = event(EmailStatus::Valid, ValidationCause::CheckedDeliverable, "q1", Timestamp::now());
        e.contact = ContactReference::Contact(id);

        assert!(transition(&pending(), &e).is_ok());
    }

    fn status_strategy() -> impl Strategy<Value = EmailStatus> {
        prop_oneof![Just(EmailStatus::Valid), Just(EmailStatus::Invalid)]
    }

    proptest! {
        #[test]
        fn applying_an_update_then_replaying_is_duplicate(
            status in status_strategy(),
            token in "[a-z0-9]{1,16}",
            offset in 0i64..10_000,
        ) {
            let at = Timestamp::now().minus_minutes(offset);
            let e = event(status, ValidationCause::Delivered, &token, at);

            let update = transition(&pending(), &e).unwrap();
            let after = resolved(update.email_status, &update.validation_message, update.validation_date);

            prop_assert_eq!(transition(&after, &e), Err(TransitionRejected::Duplicate));
        }

        #[test]
        fn newer_evidence_with_new_token_always_applies(
            current_status in status_strategy(),
            new_status in status_strategy(),
            newer_by in 0i64..10_000,
        ) {
            let then = Timestamp::now().minus_minutes(20_000);
            let current = resolved(current_status, "old", then);
            let e = event(new_status, ValidationCause::Delivered, "new", then.plus_secs(newer_by * 60));

            let update = transition(&current, &e).unwrap();

            prop_assert_eq!(update.email_status, new_status);
            prop_assert_eq!(update.validation_message, "new".to_string());
        }
    }
}
