//! Contact validation domain module.
//!
//! Holds the status state machine, the provider event normalizer and the
//! transition rules both producers (webhooks and scheduled checks) share.
//!
//! # Module Structure
//!
//! - `status` - EmailStatus state machine
//! - `contact` - Contact aggregate and the update it accepts
//! - `event` - ValidationEvent and its causes
//! - `tier` - CheckTier re-check cadence
//! - `provider_event` - Raw provider webhook payload
//! - `normalizer` - Provider payload to ValidationEvent
//! - `transition` - Duplicate/stale/last-writer-wins rules
//! - `verdict` - Scheduled check verdicts
//! - `webhook_errors` / `webhook_verifier` - Webhook transport concerns

mod contact;
mod event;
mod normalizer;
mod provider_event;
mod status;
mod tier;
mod transition;
mod verdict;
mod webhook_errors;
mod webhook_verifier;

pub use contact::{Contact, ContactStatusView, ValidationUpdate};
pub use event::{ContactReference, ValidationCause, ValidationEvent};
pub use normalizer::{normalize, NormalizationError, NormalizedEvent, LIST_ID_METADATA_KEY};
pub use provider_event::{ProviderEvent, ProviderRecordType};
#[cfg(test)]
pub use provider_event::ProviderEventBuilder;
pub use status::EmailStatus;
pub use tier::{AgeWindow, CheckTier};
pub use transition::{transition, TransitionRejected};
pub use verdict::{scheduled_check_event, Deliverability, SuggestedCorrection};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, WebhookVerifier, SIGNATURE_HEADER};
