//! In-Memory Operation Log Adapter
//!
//! Keeps entries in memory. Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{LogError, OperationLog, OperationLogEntry};

/// In-memory operation log
#[derive(Debug, Clone, Default)]
pub struct InMemoryOperationLog {
    entries: Arc<RwLock<Vec<OperationLogEntry>>>,
}

impl InMemoryOperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry (useful for tests)
    pub async fn entries(&self) -> Vec<OperationLogEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl OperationLog for InMemoryOperationLog {
    async fn append(&self, entry: OperationLogEntry) -> Result<(), LogError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn tail(&self, lines: usize) -> Result<Vec<OperationLogEntry>, LogError> {
        let entries = self.entries.read().await;
        let start = entries.len().saturating_sub(lines);
        Ok(entries[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{LogOutcome, LogSource};

    #[tokio::test]
    async fn tail_larger_than_log_returns_everything() {
        let log = InMemoryOperationLog::new();
        log.append(OperationLogEntry::new(LogSource::Scheduler, LogOutcome::Failed))
            .await
            .unwrap();

        assert_eq!(log.tail(100).await.unwrap().len(), 1);
        assert!(log.tail(0).await.unwrap().is_empty());
    }
}
