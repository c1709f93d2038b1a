//! Core shared types for the agent governance engine.

#![warn(missing_docs, clippy::pedantic)]

mod action;
mod classify;
mod redact;
mod severity;

/// Structured record of what an agent did or intends to do.
pub use action::AgentAction;
/// Error classification surfaced alongside every boundary error.
pub use classify::{Classified, ErrorBody, ErrorClass};
/// Masking helper for sensitive matched spans.
pub use redact::redact;
/// Ordered severity levels for rule violations.
pub use severity::Severity;
