//! Policy lookup and registration errors.

use thiserror::Error;

use gov_primitives::{Classified, ErrorClass};

/// Result alias for policy registry operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors produced by the policy registry.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy with the same name is already registered.
    #[error("policy `{name}` is already registered")]
    DuplicatePolicy {
        /// Name of the offending policy.
        name: String,
    },

    /// No policy is registered under the requested name.
    #[error("policy `{name}` is not registered")]
    UnknownPolicy {
        /// The requested policy name.
        name: String,
    },
}

impl Classified for PolicyError {
    fn classification(&self) -> ErrorClass {
        ErrorClass::ClientFault
    }

    fn label(&self) -> &'static str {
        match self {
            Self::DuplicatePolicy { .. } => "duplicate_policy",
            Self::UnknownPolicy { .. } => "unknown_policy",
        }
    }
}
