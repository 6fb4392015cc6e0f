//! In-Memory Contact Store Adapter
//!
//! Implements both `ContactStore` and `ContactReader` over a single map.
//! The conditional update holds the write lock for the compare and the
//! write, matching the per-row atomicity of the Postgres adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ContactId, DomainError, EmailAddress, ListId, Timestamp};
use crate::domain::validation::{AgeWindow, Contact, EmailStatus, ValidationUpdate};
use crate::ports::{
    CasOutcome, ContactReader, ContactStore, ListPendingSummary, PendingSelection,
    StatusCounts,
};

/// In-memory contact storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryContactStore {
    contacts: Arc<RwLock<HashMap<ContactId, Contact>>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `contacts`.
    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let map = contacts.into_iter().map(|c| (c.id, c)).collect();
        Self {
            contacts: Arc::new(RwLock::new(map)),
        }
    }

    /// Current copy of a contact (useful for tests)
    pub async fn get(&self, id: &ContactId) -> Option<Contact> {
        self.contacts.read().await.get(id).cloned()
    }

    /// All contacts, ordered by id
    pub async fn all(&self) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = self.contacts.read().await.values().cloned().collect();
        contacts.sort_by_key(|c| c.id);
        contacts
    }

    pub async fn len(&self) -> usize {
        self.contacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contacts.read().await.is_empty()
    }
}

fn in_list(contact: &Contact, list_id: Option<&ListId>) -> bool {
    list_id.map_or(true, |id| &contact.list_id == id)
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn find_by_id(&self, id: &ContactId) -> Result<Option<Contact>, DomainError> {
        Ok(self.contacts.read().await.get(id).cloned())
    }

    async fn find_by_address(
        &self,
        email: &EmailAddress,
        list_id: Option<&ListId>,
    ) -> Result<Vec<Contact>, DomainError> {
        let contacts = self.contacts.read().await;
        let mut found: Vec<Contact> = contacts
            .values()
            .filter(|c| &c.email == email && in_list(c, list_id))
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.created_at, c.id));
        Ok(found)
    }

    async fn select_pending(
        &self,
        list_id: Option<&ListId>,
        window: AgeWindow,
        now: Timestamp,
    ) -> Result<PendingSelection, DomainError> {
        let contacts = self.contacts.read().await;
        let mut selected: Vec<Contact> = contacts
            .values()
            .filter(|c| c.email_status == EmailStatus::Pending && in_list(c, list_id))
            .filter(|c| window.contains(now.duration_since(&c.age_reference())))
            .cloned()
            .collect();
        selected.sort_by_key(|c| (c.age_reference(), c.id));
        Ok(PendingSelection::new(selected))
    }

    async fn compare_and_set(
        &self,
        id: &ContactId,
        expected_message: Option<&str>,
        update: &ValidationUpdate,
    ) -> Result<CasOutcome, DomainError> {
        let mut contacts = self.contacts.write().await;
        match contacts.get_mut(id) {
            Some(contact) if contact.validation_message.as_deref() == expected_message => {
                contact.apply(update);
                Ok(CasOutcome::Applied)
            }
            _ => Ok(CasOutcome::Conflict),
        }
    }

    async fn insert(&self, contact: &Contact) -> Result<(), DomainError> {
        self.contacts.write().await.insert(contact.id, contact.clone());
        Ok(())
    }
}

#[async_trait]
impl ContactReader for InMemoryContactStore {
    async fn status_counts(&self, list_id: Option<&ListId>) -> Result<StatusCounts, DomainError> {
        let contacts = self.contacts.read().await;
        let mut counts = StatusCounts::default();
        for contact in contacts.values().filter(|c| in_list(c, list_id)) {
            counts.record(contact.email_status);
        }
        Ok(counts)
    }

    async fn lists_with_pending(&self) -> Result<Vec<ListPendingSummary>, DomainError> {
        let contacts = self.contacts.read().await;
        let mut by_list: HashMap<ListId, ListPendingSummary> = HashMap::new();

        for contact in contacts.values() {
            let summary = by_list.entry(contact.list_id).or_insert(ListPendingSummary {
                list_id: contact.list_id,
                pending: 0,
                total: 0,
                oldest_pending_since: None,
            });
            summary.total += 1;
            if contact.email_status == EmailStatus::Pending {
                summary.pending += 1;
                let since = contact.age_reference();
                summary.oldest_pending_since = Some(
                    summary
                        .oldest_pending_since
                        .map_or(since, |current| current.min(since)),
                );
            }
        }

        let mut lists: Vec<ListPendingSummary> =
            by_list.into_values().filter(|s| s.pending > 0).collect();
        lists.sort_by(|a, b| b.pending.cmp(&a.pending).then(a.list_id.cmp(&b.list_id)));
        Ok(lists)
    }
}
