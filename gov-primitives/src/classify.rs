//! Boundary error classification shared by every subsystem.

use serde::{Deserialize, Serialize};

/// Coarse classification attached to every error that crosses the engine
/// boundary, so transports can map it to an appropriate status without
/// inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The caller supplied something invalid (unknown policy, bad params).
    ClientFault,
    /// A storage or I/O dependency failed.
    TransportFault,
    /// An internal invariant was violated.
    Unexpected,
}

/// Wire body carried by every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short machine-readable error label.
    pub error: String,
    /// Human-readable explanation of what went wrong.
    pub detail: String,
}

/// Implemented by error types that surface at the engine boundary.
pub trait Classified {
    /// Returns the fault classification for this error.
    fn classification(&self) -> ErrorClass;

    /// Short machine-readable label identifying the error kind.
    fn label(&self) -> &'static str;
}

impl ErrorBody {
    /// Builds the wire body from any classified error.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Classified + std::fmt::Display,
    {
        Self {
            error: error.label().to_owned(),
            detail: error.to_string(),
        }
    }
}
