//! Email validation status state machine.
//!
//! A contact starts `Pending` and is resolved to `Valid` or `Invalid` by
//! delivery evidence. Resolved statuses stay mutable: later evidence
//! (a bounce after an open) is authoritative, so `Valid <-> Invalid` is legal.
//! Nothing in the reconciliation core moves a contact back to `Pending`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Deliverability status of a contact's email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// Never checked, or last check was inconclusive.
    Pending,

    /// Delivery evidence says the address receives mail.
    Valid,

    /// Delivery evidence says the address does not receive mail.
    Invalid,
}

impl EmailStatus {
    /// Returns true once a verdict has been recorded.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, EmailStatus::Pending)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Pending => "pending",
            EmailStatus::Valid => "valid",
            EmailStatus::Invalid => "invalid",
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(EmailStatus::Pending),
            "valid" => Ok(EmailStatus::Valid),
            "invalid" => Ok(EmailStatus::Invalid),
            other => Err(ValidationError::invalid_format(
                "email_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

impl StateMachine for EmailStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EmailStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Valid)
                | (Pending, Invalid)
            // Resolved statuses accept newer evidence of either kind
                | (Valid, Valid)
                | (Valid, Invalid)
                | (Invalid, Invalid)
                | (Invalid, Valid)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EmailStatus::*;
        match self {
            Pending => vec![Valid, Invalid],
            Valid => vec![Valid, Invalid],
            Invalid => vec![Invalid, Valid],
        }
    }
}
