//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] — backing model identifiers
//! - [`message::UserMessage`] — the validated message a run refines
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod message;
pub mod model;
