//! GetValidationOverviewHandler - Query handler for the monitor overview.
//!
//! Returns status counts and the lists that still have pending contacts.

use std::sync::Arc;

use serde::Serialize;

use super::MonitorError;
use crate::domain::foundation::{ListId, Timestamp};
use crate::ports::{ContactReader, ListPendingSummary, StatusCounts};

/// Query for the validation overview.
#[derive(Debug, Clone, Default)]
pub struct GetValidationOverviewQuery {
    /// Restrict counts to one list.
    pub list_id: Option<ListId>,
}

/// Monitor overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOverview {
    pub counts: StatusCounts,
    pub total: u64,
    pub lists_with_pending: Vec<ListPendingSummary>,
    pub generated_at: Timestamp,
}

/// Handler for the monitor overview.
pub struct GetValidationOverviewHandler {
    reader: Arc<dyn ContactReader>,
}

impl GetValidationOverviewHandler {
    pub fn new(reader: Arc<dyn ContactReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetValidationOverviewQuery,
    ) -> Result<ValidationOverview, MonitorError> {
        let counts = self.reader.status_counts(query.list_id.as_ref()).await?;
        let mut lists_with_pending = self.reader.lists_with_pending().await?;
        if let Some(list_id) = query.list_id {
            lists_with_pending.retain(|summary| summary.list_id == list_id);
        }

        Ok(ValidationOverview {
            counts,
            total: counts.total(),
            lists_with_pending,
            generated_at: Timestamp::now(),
        })
    }
}
