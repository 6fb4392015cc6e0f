//! PostgreSQL implementation of ContactReader.
//!
//! Aggregates are computed in SQL; nothing is cached.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::contact_store::parse_status;
use crate::domain::foundation::{DomainError, ErrorCode, ListId, Timestamp};
use crate::domain::validation::EmailStatus;
use crate::ports::{ContactReader, ListPendingSummary, StatusCounts};

/// PostgreSQL implementation of the ContactReader port.
pub struct PostgresContactReader {
    pool: PgPool,
}

impl PostgresContactReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusCountRow {
    email_status: String,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ListPendingRow {
    list_id: Uuid,
    pending: i64,
    total: i64,
    oldest_pending_since: Option<DateTime<Utc>>,
}

impl From<ListPendingRow> for ListPendingSummary {
    fn from(row: ListPendingRow) -> Self {
        ListPendingSummary {
            list_id: ListId::from_uuid(row.list_id),
            pending: non_negative(row.pending),
            total: non_negative(row.total),
            oldest_pending_since: row.oldest_pending_since.map(Timestamp::from_datetime),
        }
    }
}

fn non_negative(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn fold_counts(rows: Vec<StatusCountRow>) -> Result<StatusCounts, DomainError> {
    let mut counts = StatusCounts::default();
    for row in rows {
        let n = non_negative(row.count);
        match parse_status(&row.email_status)? {
            EmailStatus::Pending => counts.pending += n,
            EmailStatus::Valid => counts.valid += n,
            EmailStatus::Invalid => counts.invalid += n,
        }
    }
    Ok(counts)
}

#[async_trait]
impl ContactReader for PostgresContactReader {
    async fn status_counts(&self, list_id: Option<&ListId>) -> Result<StatusCounts, DomainError> {
        let rows: Vec<StatusCountRow> = sqlx::query_as(
            r#"
            SELECT email_status, COUNT(*) AS count
            FROM contacts
            WHERE ($1::uuid IS NULL OR list_id = $1)
            GROUP BY email_status
            "#,
        )
        .bind(list_id.map(|id| *id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to count contacts: {}", e))
        })?;

        fold_counts(rows)
    }

    async fn lists_with_pending(&self) -> Result<Vec<ListPendingSummary>, DomainError> {
        let rows: Vec<ListPendingRow> = sqlx::query_as(
            r#"
            SELECT
                list_id,
                COUNT(*) FILTER (WHERE email_status = 'pending') AS pending,
                COUNT(*) AS total,
                MIN(COALESCE(validation_date, created_at))
                    FILTER (WHERE email_status = 'pending') AS oldest_pending_since
            FROM contacts
            GROUP BY list_id
            HAVING COUNT(*) FILTER (WHERE email_status = 'pending') > 0
            ORDER BY pending DESC, list_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list pending contacts: {}", e),
            )
        })?;

        Ok(rows.into_iter().map(ListPendingSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_counts_sums_by_status() {
        let counts = fold_counts(vec![
            StatusCountRow { email_status: "pending".into(), count: 4 },
            StatusCountRow { email_status: "invalid".into(), count: 1 },
        ])
        .unwrap();

        assert_eq!(counts, StatusCounts { pending: 4, valid: 0, invalid: 1 });
    }

    #[test]
    fn fold_counts_rejects_unknown_status() {
        let result = fold_counts(vec![StatusCountRow { email_status: "x".into(), count: 1 }]);
        assert!(result.is_err());
    }

    #[test]
    fn pending_row_converts_to_summary() {
        let summary = ListPendingSummary::from(ListPendingRow {
            list_id: Uuid::new_v4(),
            pending: 2,
            total: 9,
            oldest_pending_since: None,
        });
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.total, 9);
    }
}
