//! Core data models for the Drive gateway.
//!
//! These entities mirror the provider's wire format via `serde` and carry
//! the validated query shapes the services operate on.

pub mod credential;
pub mod entry;
pub mod listing;
