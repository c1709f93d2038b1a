//! Error types for the audit subsystem.

use serde_json::Error as SerdeError;
use thiserror::Error;

use gov_primitives::{Classified, ErrorClass};

/// Result type alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

/// Errors emitted by audit stores.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying I/O failure while reading or writing the ledger.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// Serialization or deserialization error.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: SerdeError,
    },
}

impl Classified for AuditError {
    fn classification(&self) -> ErrorClass {
        ErrorClass::TransportFault
    }

    fn label(&self) -> &'static str {
        "storage_fault"
    }
}
