//! PostgreSQL implementation of ContactStore.
//!
//! The conditional update is a single `UPDATE ... WHERE validation_message IS
//! NOT DISTINCT FROM $expected`, so the compare and the write are one atomic
//! row operation.

use crate::domain::foundation::{
    ContactId, DomainError, EmailAddress, ErrorCode, ListId, Timestamp,
};
use crate::domain::validation::{AgeWindow, Contact, EmailStatus, ValidationCause, ValidationUpdate};
use crate::ports::{CasOutcome, ContactStore, PendingSelection};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// PostgreSQL implementation of the ContactStore port.
pub struct PostgresContactStore {
    pool: PgPool,
}

impl PostgresContactStore {
    /// Creates a new PostgresContactStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a contact.
#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    list_id: Uuid,
    email: String,
    email_status: String,
    email_event: Option<String>,
    validation_message: Option<String>,
    validation_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = DomainError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(&row.email).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored email: {}", e))
        })?;

        Ok(Contact {
            id: ContactId::from_uuid(row.id),
            list_id: ListId::from_uuid(row.list_id),
            email,
            email_status: parse_status(&row.email_status)?,
            email_event: row.email_event.as_deref().map(ValidationCause::parse),
            validation_message: row.validation_message,
            validation_date: row.validation_date.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

pub(super) fn parse_status(s: &str) -> Result<EmailStatus, DomainError> {
    s.parse::<EmailStatus>().map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid email_status value: {}", s),
        )
    })
}

fn status_to_string(status: &EmailStatus) -> &'static str {
    status.as_str()
}

const CONTACT_COLUMNS: &str = "id, list_id, email, email_status, email_event, \
     validation_message, validation_date, created_at";

/// Stored addresses are matched case-insensitively; `$1` is already lowercase.
const FIND_BY_ADDRESS_FILTER: &str = "lower(email) = $1 AND ($2::uuid IS NULL OR list_id = $2)";

/// Converts rows, setting aside the ones that no longer parse.
fn split_rows(rows: Vec<ContactRow>) -> (Vec<Contact>, Vec<ContactId>) {
    let mut contacts = Vec::with_capacity(rows.len());
    let mut unreadable = Vec::new();
    for row in rows {
        let id = ContactId::from_uuid(row.id);
        match Contact::try_from(row) {
            Ok(contact) => contacts.push(contact),
            Err(e) => {
                warn!(contact_id = %id, error = %e, "Skipping unreadable contact row");
                unreadable.push(id);
            }
        }
    }
    (contacts, unreadable)
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl ContactStore for PostgresContactStore {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, DomainError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "SELECT {} FROM contacts WHERE id = $1",
            CONTACT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find contact", e))?;

        row.map(Contact::try_from).transpose()
    }

    async fn find_by_address(
        &self,
        email: &EmailAddress,
        list_id: Option<&ListId>,
    ) -> Result<Vec<Contact>, DomainError> {
        let rows: Vec<ContactRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM contacts
            WHERE {}
            ORDER BY created_at, id
            "#,
            CONTACT_COLUMNS, FIND_BY_ADDRESS_FILTER
        ))
        .bind(email.as_str())
        .bind(list_id.map(|id| *id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find contacts by address", e))?;

        let (contacts, _) = split_rows(rows);
        Ok(contacts)
    }

    async fn select_pending(
        &self,
        list_id: Option<&ListId>,
        window: AgeWindow,
        now: Timestamp,
    ) -> Result<PendingSelection, DomainError> {
        // age >= min  <=>  reference <= now - min
        // age <  max  <=>  reference >  now - max
        let newest_reference = now.minus(window.min);
        let oldest_reference = window.max.map(|max| *now.minus(max).as_datetime());

        let rows: Vec<ContactRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM contacts
            WHERE email_status = 'pending'
              AND ($1::uuid IS NULL OR list_id = $1)
              AND COALESCE(validation_date, created_at) <= $2
              AND ($3::timestamptz IS NULL OR COALESCE(validation_date, created_at) > $3)
            ORDER BY COALESCE(validation_date, created_at), id
            "#,
            CONTACT_COLUMNS
        ))
        .bind(list_id.map(|id| *id.as_uuid()))
        .bind(newest_reference.as_datetime())
        .bind(oldest_reference)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to select pending contacts", e))?;

        let (contacts, unreadable) = split_rows(rows);
        Ok(PendingSelection { contacts, unreadable })
    }

    async fn compare_and_set(
        &self,
        id: &ContactId,
        expected_message: Option<&str>,
        update: &ValidationUpdate,
    ) -> Result<CasOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE contacts SET
                email_status = $2,
                email_event = $3,
                validation_message = $4,
                validation_date = $5
            WHERE id = $1
              AND validation_message IS NOT DISTINCT FROM $6
            "#,
        )
        .bind(id.as_uuid())
        .bind(status_to_string(&update.email_status))
        .bind(update.email_event.as_str())
        .bind(&update.validation_message)
        .bind(update.validation_date.as_datetime())
        .bind(expected_message)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update contact", e))?;

        if result.rows_affected() == 0 {
            return Ok(CasOutcome::Conflict);
        }
        Ok(CasOutcome::Applied)
    }

    async fn insert(&self, contact: &Contact) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO contacts (
                id, list_id, email, email_status, email_event,
                validation_message, validation_date, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(contact.id.as_uuid())
        .bind(contact.list_id.as_uuid())
        .bind(contact.email.as_str())
        .bind(status_to_string(&contact.email_status))
        .bind(contact.email_event.as_ref().map(|e| e.as_str().to_string()))
        .bind(&contact.validation_message)
        .bind(contact.validation_date.map(|d| *d.as_datetime()))
        .bind(contact.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert contact", e))?;

        Ok(())
    }
}
