//! Error handling for TrellisDB.
//!
//! This module provides the unified error type and result alias used
//! across all TrellisDB components.
//!
//! Note that "row not found" is deliberately not an error: reads and
//! deletes of an absent row produce a zero-entry result.

use thiserror::Error;

/// The unified error type for TrellisDB operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A command's argument list has the wrong shape. Rejected before any
    /// engine call; the transaction is untouched.
    #[error("invalid command arguments: {0}")]
    InvalidArguments(String),

    /// A packed key could not be decoded.
    #[error("malformed packed key: {0}")]
    MalformedKey(String),

    /// A serialized column buffer could not be decoded.
    #[error("malformed column buffer: {0}")]
    MalformedBuffer(String),

    /// No operation is registered under the command name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A table could not be opened or created.
    #[error("cannot open table {name:?}: {reason}")]
    TableOpen {
        /// The requested table name, lossily decoded for display.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// The underlying engine failed structurally. Cursor exhaustion is not
    /// an engine error; it is reported as a `None` record.
    #[error("engine error: {0}")]
    Engine(String),

    /// The transaction was already committed or aborted.
    #[error("transaction is closed")]
    TxnClosed,
}

/// Result type alias for TrellisDB operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidArguments("odd column count".to_string());
        assert_eq!(err.to_string(), "invalid command arguments: odd column count");

        let err = StoreError::TableOpen {
            name: "users".to_string(),
            reason: "table does not exist".to_string(),
        };
        assert!(err.to_string().contains("users"));
        assert!(err.to_string().contains("does not exist"));

        assert_eq!(StoreError::TxnClosed.to_string(), "transaction is closed");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            StoreError::UnknownCommand("Frob".to_string()),
            StoreError::UnknownCommand("Frob".to_string())
        );
        assert_ne!(
            StoreError::UnknownCommand("Frob".to_string()),
            StoreError::TxnClosed
        );
    }
}
