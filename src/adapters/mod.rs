//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum routes for the delivery webhook and the monitor
//! - `memory` - In-memory contact store
//! - `postgres` - PostgreSQL contact store and reader
//! - `provider` - HTTP client for the validation provider
//! - `storage` - Operation log (JSON lines file, in-memory)

pub mod http;
pub mod memory;
pub mod postgres;
pub mod provider;
pub mod storage;

pub use memory::InMemoryContactStore;
pub use postgres::{PostgresContactReader, PostgresContactStore};
pub use provider::{HttpValidationConfig, HttpValidationProvider};
pub use storage::{FileOperationLog, InMemoryOperationLog};
