//! OperationLog port - append-only record of every reconciliation outcome.
//!
//! Webhook ingestion and scheduled checks append one entry per contact
//! decision (or one per event when no contact was resolved). The monitor
//! reads the tail.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{ContactId, Timestamp};

/// Which producer recorded the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
    Webhook,
    Scheduler,
}

/// Outcome category of a logged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutcome {
    Applied,
    Skipped,
    Inconclusive,
    Failed,
    BadRequest,
}

/// One line of the operational log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub at: Timestamp,
    pub source: LogSource,
    pub outcome: LogOutcome,

    /// Skip reason, error text or applied status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Raw correlation token as received, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,

    /// Resolved contact; `None` is written as "not found".
    #[serde(default, with = "contact_or_not_found")]
    pub contact_id: Option<ContactId>,
}

impl OperationLogEntry {
    pub fn new(source: LogSource, outcome: LogOutcome) -> Self {
        Self {
            at: Timestamp::now(),
            source,
            outcome,
            detail: None,
            correlation_token: None,
            contact_id: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.correlation_token = Some(token.into());
        self
    }

    pub fn with_contact(mut self, contact_id: ContactId) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    /// Contact id for display, or "not found".
    pub fn contact_label(&self) -> String {
        self.contact_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| NOT_FOUND.to_string())
    }
}

const NOT_FOUND: &str = "not found";

mod contact_or_not_found {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::NOT_FOUND;
    use crate::domain::foundation::ContactId;

    pub fn serialize<S: Serializer>(id: &Option<ContactId>, s: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => s.collect_str(id),
            None => s.serialize_str(NOT_FOUND),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ContactId>, D::Error> {
        match Option::<String>::deserialize(d)?.as_deref() {
            None | Some(NOT_FOUND) => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

/// Errors from the operational log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("log serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for the operational log.
#[async_trait]
pub trait OperationLog: Send + Sync {
    /// Append one entry.
    async fn append(&self, entry: OperationLogEntry) -> Result<(), LogError>;

    /// The last `lines` entries, oldest first.
    async fn tail(&self, lines: usize) -> Result<Vec<OperationLogEntry>, LogError>;
}
