//! Compare-and-swap loop shared by webhook ingestion and scheduled checks.

use tracing::debug;

use crate::domain::foundation::DomainError;
use crate::domain::validation::{transition, Contact, TransitionRejected, ValidationEvent, ValidationUpdate};
use crate::ports::{CasOutcome, ContactStore};

/// Result of applying one event to one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The update was written.
    Applied(ValidationUpdate),
    /// The transition rules refused the event.
    Rejected(TransitionRejected),
    /// The contact disappeared between read and write.
    NotFound,
    /// Every attempt lost the race to another writer.
    Contended { attempts: u32 },
}

/// Applies `event` to `contact`, re-reading and re-evaluating on conflict.
///
/// `contact` is the caller's last read. At most `1 + max_retries` writes are
/// attempted.
pub async fn apply_transition(
    store: &dyn ContactStore,
    contact: Contact,
    event: &ValidationEvent,
    max_retries: u32,
) -> Result<ApplyOutcome, DomainError> {
    let mut current = contact;
    let attempts = max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        let update = match transition(&current.status_view(), event) {
            Ok(update) => update,
            Err(rejected) => return Ok(ApplyOutcome::Rejected(rejected)),
        };

        match store
            .compare_and_set(&current.id, current.validation_message.as_deref(), &update)
            .await?
        {
            CasOutcome::Applied => return Ok(ApplyOutcome::Applied(update)),
            CasOutcome::Conflict => {
                debug!(
                    contact_id = %current.id,
                    correlation_token = %event.correlation_token,
                    attempt,
                    "Conditional update lost a race, re-reading contact"
                );
                current = match store.find_by_id(&current.id).await? {
                    Some(contact) => contact,
                    None => return Ok(ApplyOutcome::NotFound),
                };
            }
        }
    }

    Ok(ApplyOutcome::Contended { attempts })
}
