//! GetOperationLogHandler - Query handler for the operation log tail.

use std::sync::Arc;

use super::MonitorError;
use crate::ports::{OperationLog, OperationLogEntry};

/// Lines returned when the caller does not ask for a count.
pub const DEFAULT_LOG_LINES: usize = 50;

/// Upper bound on lines per request.
pub const MAX_LOG_LINES: usize = 1000;

/// Query for the most recent log entries.
#[derive(Debug, Clone)]
pub struct GetOperationLogQuery {
    pub lines: Option<usize>,
}

/// Handler for reading the operation log.
pub struct GetOperationLogHandler {
    oplog: Arc<dyn OperationLog>,
}

impl GetOperationLogHandler {
    pub fn new(oplog: Arc<dyn OperationLog>) -> Self {
        Self { oplog }
    }

    pub async fn handle(
        &self,
        query: GetOperationLogQuery,
    ) -> Result<Vec<OperationLogEntry>, MonitorError> {
        let lines = query.lines.unwrap_or(DEFAULT_LOG_LINES).min(MAX_LOG_LINES);
        Ok(self.oplog.tail(lines).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryOperationLog;
    use crate::ports::{LogOutcome, LogSource};

    async fn log_with(n: usize) -> Arc<InMemoryOperationLog> {
        let log = Arc::new(InMemoryOperationLog::new());
        for i in 0..n {
            log.append(
                OperationLogEntry::new(LogSource::Webhook, LogOutcome::Skipped)
                    .with_token(format!("m{}", i)),
            )
            .await
            .unwrap();
        }
        log
    }

    #[tokio::test]
    async fn default_line_count_applies() {
        let handler = GetOperationLogHandler::new(log_with(60).await);

        let entries = handler.handle(GetOperationLogQuery { lines: None }).await.unwrap();

        assert_eq!(entries.len(), DEFAULT_LOG_LINES);
        assert_eq!(entries.last().unwrap().correlation_token.as_deref(), Some("m59"));
    }

    #[tokio::test]
    async fn requested_lines_are_capped() {
        let handler = GetOperationLogHandler::new(log_with(3).await);

        let entries = handler
            .handle(GetOperationLogQuery { lines: Some(usize::MAX) })
            .await
            .unwrap();

        assert_eq!(entries.len(), 3);
    }
}
