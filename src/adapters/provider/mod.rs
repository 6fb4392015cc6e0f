//! Validation provider adapters.

mod http_validation_provider;

pub use http_validation_provider::{HttpValidationConfig, HttpValidationProvider};
