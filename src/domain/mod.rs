//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `validation` - Contact validation status, event normalization and transition rules

pub mod foundation;
pub mod validation;
