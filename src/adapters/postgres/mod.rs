//! PostgreSQL adapters - Database implementations for store ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresContactStore` - Contact lookup, pending selection, conditional update
//! - `PostgresContactReader` - Status aggregates for the monitor

mod contact_reader;
mod contact_store;

pub use contact_reader::PostgresContactReader;
pub use contact_store::PostgresContactStore;
