//! Contact Reconciler - Email validation status reconciliation
//!
//! Keeps each contact's `email_status` in step with delivery evidence from two
//! producers: delivery provider webhooks and a scheduled, tiered re-check job
//! that queries the validation provider for contacts still pending.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
