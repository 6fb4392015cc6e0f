//! Validation events - the normalized result of one provider notification
//! or one scheduled check.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::EmailStatus;
use crate::domain::foundation::{ContactId, EmailAddress, ListId, Timestamp};

/// Cause recorded in a contact's `email_event` column.
///
/// The column is free-form; values written by older importers are kept
/// verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationCause {
    Opened,
    Delivered,
    Bounced,
    Complained,
    CheckedDeliverable,
    CheckedUndeliverable,
    Other(String),
}

impl ValidationCause {
    /// Storage representation.
    pub fn as_str(&self) -> &str {
        match self {
            ValidationCause::Opened => "opened",
            ValidationCause::Delivered => "delivered",
            ValidationCause::Bounced => "bounced",
            ValidationCause::Complained => "complained",
            ValidationCause::CheckedDeliverable => "checked-deliverable",
            ValidationCause::CheckedUndeliverable => "checked-undeliverable",
            ValidationCause::Other(s) => s,
        }
    }

    /// Parses a stored value. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "opened" => ValidationCause::Opened,
            "delivered" => ValidationCause::Delivered,
            "bounced" => ValidationCause::Bounced,
            "complained" => ValidationCause::Complained,
            "checked-deliverable" => ValidationCause::CheckedDeliverable,
            "checked-undeliverable" => ValidationCause::CheckedUndeliverable,
            other => ValidationCause::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ValidationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValidationCause {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ValidationCause {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ValidationCause::parse(&s))
    }
}

/// How an event identifies the contact(s) it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactReference {
    /// A specific contact row (scheduled checks).
    Contact(ContactId),

    /// Every contact with this address, optionally restricted to one list
    /// (webhooks).
    Address {
        email: EmailAddress,
        list_id: Option<ListId>,
    },
}

/// Normalized validation evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEvent {
    pub contact: ContactReference,

    /// Provider message id or check query id. Doubles as the dedup key.
    pub correlation_token: String,

    pub observed_status: EmailStatus,

    pub cause: ValidationCause,

    /// When the provider observed the evidence; the ordering key.
    pub observed_at: Timestamp,
}
