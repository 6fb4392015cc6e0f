//! IngestWebhookHandler - Command handler for delivery provider callbacks.
//!
//! Verifies, parses and normalizes a callback, resolves every contact with the
//! recipient address and applies the status transition once per correlation
//! token. Business outcomes are results, never errors; only signature,
//! payload and store failures surface as `WebhookError`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::apply_transition::{apply_transition, ApplyOutcome};
use crate::domain::foundation::{ContactId, Timestamp};
use crate::domain::validation::{
    normalize, ContactReference, EmailStatus, NormalizedEvent, ProviderEvent, TransitionRejected,
    ValidationCause, WebhookError, WebhookVerifier,
};
use crate::ports::{
    ContactStore, LogOutcome, LogSource, OperationLog, OperationLogEntry,
};

/// Default number of re-reads after a lost conditional update.
pub const DEFAULT_CAS_RETRIES: u32 = 3;

/// Command to ingest one provider callback.
#[derive(Debug, Clone)]
pub struct IngestWebhookCommand {
    /// Raw request body.
    pub payload: Vec<u8>,
    /// `X-Webhook-Signature` header, if sent.
    pub signature: Option<String>,
}

/// Why a callback changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnsupportedType,
    ContactNotFound,
    Duplicate,
    Stale,
    IllegalTransition,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::UnsupportedType => "unsupported_type",
            SkipReason::ContactNotFound => "contact_not_found",
            SkipReason::Duplicate => "duplicate",
            SkipReason::Stale => "stale",
            SkipReason::IllegalTransition => "illegal_transition",
        }
    }
}

impl From<&TransitionRejected> for SkipReason {
    fn from(rejected: &TransitionRejected) -> Self {
        match rejected {
            TransitionRejected::Duplicate => SkipReason::Duplicate,
            TransitionRejected::Stale { .. } => SkipReason::Stale,
            TransitionRejected::Illegal(_) => SkipReason::IllegalTransition,
        }
    }
}

/// Result of ingesting a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestResult {
    /// At least one contact changed.
    Applied {
        contact_ids: Vec<ContactId>,
        status: EmailStatus,
        event: ValidationCause,
    },
    /// Nothing changed.
    Skipped {
        reason: SkipReason,
        correlation_token: Option<String>,
    },
}

/// Handler for delivery provider callbacks.
pub struct IngestWebhookHandler {
    store: Arc<dyn ContactStore>,
    oplog: Arc<dyn OperationLog>,
    verifier: Option<Arc<WebhookVerifier>>,
    cas_retries: u32,
}

impl IngestWebhookHandler {
    pub fn new(store: Arc<dyn ContactStore>, oplog: Arc<dyn OperationLog>) -> Self {
        Self {
            store,
            oplog,
            verifier: None,
            cas_retries: DEFAULT_CAS_RETRIES,
        }
    }

    /// Require a valid signature on every callback.
    pub fn with_verifier(mut self, verifier: Arc<WebhookVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_cas_retries(mut self, cas_retries: u32) -> Self {
        self.cas_retries = cas_retries;
        self
    }

    pub async fn handle(&self, cmd: IngestWebhookCommand) -> Result<IngestResult, WebhookError> {
        // 1. Authenticate
        if let Some(verifier) = &self.verifier {
            let signature = cmd.signature.as_deref().ok_or(WebhookError::MissingSignature)?;
            verifier.verify(&cmd.payload, signature).map_err(|e| {
                warn!(error = %e, "Rejected webhook with bad signature");
                e
            })?;
        }

        // 2. Parse
        let raw = match ProviderEvent::from_slice(&cmd.payload) {
            Ok(raw) => raw,
            Err(e) => {
                self.record(
                    OperationLogEntry::new(LogSource::Webhook, LogOutcome::BadRequest)
                        .with_detail(format!("unparseable body: {}", e)),
                )
                .await;
                return Err(WebhookError::BadRequest(e.to_string()));
            }
        };

        // 3. Normalize
        let event = match normalize(&raw, Timestamp::now()) {
            Ok(NormalizedEvent::Supported(event)) => event,
            Ok(NormalizedEvent::Unsupported { record_type }) => {
                debug!(record_type = %record_type, "Ignoring unsupported record type");
                return Ok(self
                    .skipped(SkipReason::UnsupportedType, raw.message_id.clone())
                    .await);
            }
            Err(e) => {
                let mut entry = OperationLogEntry::new(LogSource::Webhook, LogOutcome::BadRequest)
                    .with_detail(e.to_string());
                if let Some(token) = &raw.message_id {
                    entry = entry.with_token(token.clone());
                }
                self.record(entry).await;
                return Err(e.into());
            }
        };

        // 4. Resolve
        let (email, list_id) = match &event.contact {
            ContactReference::Address { email, list_id } => (email.clone(), *list_id),
            ContactReference::Contact(_) => {
                return Err(WebhookError::MalformedEvent(
                    "webhook events must reference an address".to_string(),
                ))
            }
        };
        let token = event.correlation_token.clone();
        let contacts = match self.store.find_by_address(&email, list_id.as_ref()).await {
            Ok(contacts) => contacts,
            Err(e) => return Err(self.store_failed(&token, None, e.to_string()).await),
        };

        if contacts.is_empty() {
            info!(correlation_token = %token, "No contact for webhook recipient");
            return Ok(self.skipped(SkipReason::ContactNotFound, Some(token)).await);
        }

        // 5. Apply per contact
        let mut applied = Vec::new();
        let mut first_rejection: Option<SkipReason> = None;

        for contact in contacts {
            let contact_id = contact.id;
            let outcome =
                match apply_transition(self.store.as_ref(), contact, &event, self.cas_retries).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        return Err(self.store_failed(&token, Some(contact_id), e.to_string()).await)
                    }
                };
            match outcome {
                ApplyOutcome::Applied(update) => {
                    info!(
                        contact_id = %contact_id,
                        correlation_token = %token,
                        status = %update.email_status,
                        "Applied webhook transition"
                    );
                    self.record(
                        OperationLogEntry::new(LogSource::Webhook, LogOutcome::Applied)
                            .with_contact(contact_id)
                            .with_token(token.clone())
                            .with_detail(format!("{}/{}", update.email_status, update.email_event)),
                    )
                    .await;
                    applied.push(contact_id);
                }
                ApplyOutcome::Rejected(rejected) => {
                    debug!(contact_id = %contact_id, reason = rejected.reason(), "Webhook rejected");
                    let reason = SkipReason::from(&rejected);
                    self.record(
                        OperationLogEntry::new(LogSource::Webhook, LogOutcome::Skipped)
                            .with_contact(contact_id)
                            .with_token(token.clone())
                            .with_detail(reason.as_str()),
                    )
                    .await;
                    first_rejection.get_or_insert(reason);
                }
                ApplyOutcome::NotFound => {
                    self.record(
                        OperationLogEntry::new(LogSource::Webhook, LogOutcome::Skipped)
                            .with_token(token.clone())
                            .with_detail(SkipReason::ContactNotFound.as_str()),
                    )
                    .await;
                    first_rejection.get_or_insert(SkipReason::ContactNotFound);
                }
                ApplyOutcome::Contended { attempts } => {
                    warn!(contact_id = %contact_id, attempts, "Giving up on contended contact");
                    let detail = format!(
                        "contact {} still contended after {} attempts",
                        contact_id, attempts
                    );
                    return Err(self.store_failed(&token, Some(contact_id), detail).await);
                }
            }
        }

        // 6. Summarize
        if applied.is_empty() {
            return Ok(IngestResult::Skipped {
                reason: first_rejection.unwrap_or(SkipReason::ContactNotFound),
                correlation_token: Some(token),
            });
        }

        Ok(IngestResult::Applied {
            contact_ids: applied,
            status: event.observed_status,
            event: event.cause,
        })
    }

    async fn skipped(&self, reason: SkipReason, correlation_token: Option<String>) -> IngestResult {
        let mut entry = OperationLogEntry::new(LogSource::Webhook, LogOutcome::Skipped)
            .with_detail(reason.as_str());
        if let Some(token) = &correlation_token {
            entry = entry.with_token(token.clone());
        }
        self.record(entry).await;

        IngestResult::Skipped {
            reason,
            correlation_token,
        }
    }

    /// Logs a store failure for this event and builds the error to return.
    async fn store_failed(
        &self,
        token: &str,
        contact_id: Option<ContactId>,
        detail: String,
    ) -> WebhookError {
        error!(correlation_token = %token, error = %detail, "Webhook could not be stored");
        let mut entry = OperationLogEntry::new(LogSource::Webhook, LogOutcome::Failed)
            .with_token(token)
            .with_detail(detail.clone());
        if let Some(contact_id) = contact_id {
            entry = entry.with_contact(contact_id);
        }
        self.record(entry).await;
        WebhookError::StoreWriteFailed(detail)
    }

    async fn record(&self, entry: OperationLogEntry) {
        if let Err(e) = self.oplog.append(entry).await {
            warn!(error = %e, "Failed to append to operation log");
        }
    }
}
