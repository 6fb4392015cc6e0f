//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `ContactStore` - Contact lookup, pending selection and conditional update
//! - `ContactReader` - Status aggregates for the monitor
//!
//! ## External Service Ports
//!
//! - `ValidationProvider` - Single-address deliverability query
//! - `OperationLog` - Append-only outcome log

mod contact_reader;
mod contact_store;
mod operation_log;
mod validation_provider;

pub use contact_reader::{ContactReader, ListPendingSummary, StatusCounts};
pub use contact_store::{CasOutcome, ContactStore, PendingSelection};
pub use operation_log::{LogError, LogOutcome, LogSource, OperationLog, OperationLogEntry};
pub use validation_provider::{ProviderError, ProviderVerdict, ValidationProvider};
