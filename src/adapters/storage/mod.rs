//! Storage Adapters
//!
//! Implementations of the OperationLog port.
//!
//! ## Available Adapters
//!
//! - **FileOperationLog** - JSON lines on disk
//! - **InMemoryOperationLog** - Entries in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileOperationLog, InMemoryOperationLog};
//!
//! // Production: file-based log
//! let log = FileOperationLog::new("./data/reconciliation.log");
//!
//! // Testing: in-memory log
//! let log = InMemoryOperationLog::new();
//! ```

mod file_operation_log;
mod in_memory_operation_log;

pub use file_operation_log::FileOperationLog;
pub use in_memory_operation_log::InMemoryOperationLog;
