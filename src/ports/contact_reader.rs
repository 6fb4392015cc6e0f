//! Contact reader port (read side / monitor queries).
//!
//! Aggregations for the monitor interface. Never mutates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ListId, Timestamp};
use crate::domain::validation::EmailStatus;

/// Reader port for validation status aggregates.
#[async_trait]
pub trait ContactReader: Send + Sync {
    /// Contact counts per status, across all lists or within one.
    async fn status_counts(&self, list_id: Option<&ListId>) -> Result<StatusCounts, DomainError>;

    /// Lists that still have pending contacts, most pending first.
    async fn lists_with_pending(&self) -> Result<Vec<ListPendingSummary>, DomainError>;
}

/// Number of contacts in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub valid: u64,
    pub invalid: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.valid + self.invalid
    }

    /// Adds one contact of `status`.
    pub fn record(&mut self, status: EmailStatus) {
        match status {
            EmailStatus::Pending => self.pending += 1,
            EmailStatus::Valid => self.valid += 1,
            EmailStatus::Invalid => self.invalid += 1,
        }
    }
}

/// A list with outstanding pending contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPendingSummary {
    pub list_id: ListId,
    pub pending: u64,
    pub total: u64,
    /// Age reference of the longest-waiting pending contact.
    pub oldest_pending_since: Option<Timestamp>,
}
