//! Contact aggregate - one email address within one list.
//!
//! Contacts are created by list import and never deleted here. The
//! reconciliation core only touches the four validation fields, and always
//! sets them together through a [`ValidationUpdate`].

use serde::{Deserialize, Serialize};

use super::{EmailStatus, ValidationCause};
use crate::domain::foundation::{ContactId, EmailAddress, ListId, Timestamp};

/// A contact and its current validation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub list_id: ListId,
    pub email: EmailAddress,
    pub email_status: EmailStatus,
    pub email_event: Option<ValidationCause>,
    pub validation_message: Option<String>,
    pub validation_date: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Contact {
    /// Creates a never-checked contact, as list import would.
    pub fn new_pending(list_id: ListId, email: EmailAddress, created_at: Timestamp) -> Self {
        Self {
            id: ContactId::new(),
            list_id,
            email,
            email_status: EmailStatus::Pending,
            email_event: None,
            validation_message: None,
            validation_date: None,
            created_at,
        }
    }

    /// The subset of fields the transition rules read.
    pub fn status_view(&self) -> ContactStatusView {
        ContactStatusView {
            email_status: self.email_status,
            validation_message: self.validation_message.clone(),
            validation_date: self.validation_date,
        }
    }

    /// Point in time tier ages are measured from.
    pub fn age_reference(&self) -> Timestamp {
        self.validation_date.unwrap_or(self.created_at)
    }

    /// Writes all validation fields at once.
    pub fn apply(&mut self, update: &ValidationUpdate) {
        self.email_status = update.email_status;
        self.email_event = Some(update.email_event.clone());
        self.validation_message = Some(update.validation_message.clone());
        self.validation_date = Some(update.validation_date);
    }
}

/// Read-only snapshot of a contact's validation fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactStatusView {
    pub email_status: EmailStatus,
    pub validation_message: Option<String>,
    pub validation_date: Option<Timestamp>,
}

/// The full set of validation fields produced by an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationUpdate {
    pub email_status: EmailStatus,
    pub email_event: ValidationCause,
    pub validation_message: String,
    pub validation_date: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact::new_pending(
            ListId::new(),
            EmailAddress::new("c1@example.com").unwrap(),
            Timestamp::now().minus_minutes(5),
        )
    }

    #[test]
    fn new_contact_is_pending_without_message() {
        let c = contact();
        assert_eq!(c.email_status, EmailStatus::Pending);
        assert!(c.validation_message.is_none());
        assert!(c.validation_date.is_none());
        assert!(c.email_event.is_none());
    }

    #[test]
    fn age_reference_falls_back_to_created_at() {
        let mut c = contact();
        assert_eq!(c.age_reference(), c.created_at);

        let checked_at = Timestamp::now();
        c.validation_date = Some(checked_at);
        assert_eq!(c.age_reference(), checked_at);
    }

    #[test]
    fn apply_sets_all_fields_together() {
        let mut c = contact();
        let at = Timestamp::now();
        c.apply(&ValidationUpdate {
            email_status: EmailStatus::Invalid,
            email_event: ValidationCause::Bounced,
            validation_message: "m1".to_string(),
            validation_date: at,
        });

        assert_eq!(c.email_status, EmailStatus::Invalid);
        assert_eq!(c.email_event, Some(ValidationCause::Bounced));
        assert_eq!(c.validation_message.as_deref(), Some("m1"));
        assert_eq!(c.validation_date, Some(at));
    }

    #[test]
    fn status_view_reflects_validation_fields() {
        let mut c = contact();
        c.validation_message = Some("m9".to_string());
        let view = c.status_view();
        assert_eq!(view.email_status, EmailStatus::Pending);
        assert_eq!(view.validation_message.as_deref(), Some("m9"));
    }
}
