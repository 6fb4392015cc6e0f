//! ContactStore port - durable contact records and their validation state.
//!
//! Both producers (webhook ingestion and the scheduled job) mutate contacts
//! exclusively through [`ContactStore::compare_and_set`], a single-row
//! conditional update keyed on the stored `validation_message`. There is no
//! cross-contact locking.

use async_trait::async_trait;

use crate::domain::foundation::{ContactId, DomainError, EmailAddress, ListId, Timestamp};
use crate::domain::validation::{AgeWindow, Contact, ValidationUpdate};

/// Result of a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The row still carried the expected token and was updated.
    Applied,
    /// Another writer changed the row (or it disappeared) in the meantime.
    Conflict,
}

/// Result of a pending-contact query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSelection {
    pub contacts: Vec<Contact>,

    /// Rows that matched the window but could not be read back, such as a
    /// stored address that no longer parses.
    pub unreadable: Vec<ContactId>,
}

impl PendingSelection {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            unreadable: Vec::new(),
        }
    }

    /// Every matched row, readable or not.
    pub fn len(&self) -> usize {
        self.contacts.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Port for contact persistence.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Find a contact by ID.
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, DomainError>;

    /// Find every contact with this address, optionally within one list.
    ///
    /// The address is already normalized; implementations compare it against
    /// the lowercased stored address. Rows that cannot be read are skipped.
    async fn find_by_address(
        &self,
        email: &EmailAddress,
        list_id: Option<&ListId>,
    ) -> Result<Vec<Contact>, DomainError>;

    /// Pending contacts whose age at `now` falls within `window`.
    ///
    /// Age is measured from `validation_date`, or `created_at` when the
    /// contact has never been touched. Results are ordered oldest first.
    /// A row that cannot be read is reported in `unreadable` rather than
    /// failing the query.
    async fn select_pending(
        &self,
        list_id: Option<&ListId>,
        window: AgeWindow,
        now: Timestamp,
    ) -> Result<PendingSelection, DomainError>;

    /// Writes `update` only if the stored `validation_message` still equals
    /// `expected_message` (`None` matches an unset token).
    async fn compare_and_set(
        &self,
        id: &ContactId,
        expected_message: Option<&str>,
        update: &ValidationUpdate,
    ) -> Result<CasOutcome, DomainError>;

    /// Insert a contact. List import owns creation; this exists for seeding.
    async fn insert(&self, contact: &Contact) -> Result<(), DomainError>;
}
