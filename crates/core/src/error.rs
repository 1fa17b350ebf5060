//! Unified error types for streamstore.
//!
//! This module provides the canonical error taxonomy for all operations.
//! Every failure the facade can surface maps to exactly one variant here.
//!
//! ## Error Codes (Canonical)
//!
//! | Code | Description |
//! |------|-------------|
//! | InvalidArgument | Structurally invalid input to the facade |
//! | Concurrency | Optimistic-concurrency violation (version already taken) |
//! | InvalidState | Transaction-lifecycle misuse |
//! | Store | Failure from the underlying key-value operations |

use thiserror::Error;

/// All streamstore errors.
///
/// This is the canonical error type for all operations. Errors are never
/// retried internally and never swallowed; the caller decides on retry
/// policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Structurally invalid input to the facade (e.g. an empty stream
    /// passed to `create`, a zero version on an event record)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Optimistic-concurrency violation: an event at this version already
    /// exists in the given index
    #[error("concurrency conflict: version {version} already recorded in {index_key}")]
    Concurrency {
        /// The index that rejected the write
        index_key: String,
        /// The version that was already taken
        version: u64,
    },

    /// Transaction-lifecycle misuse (nested begin, commit/rollback with no
    /// active transaction)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Failure from the underlying key-value operations (network, script
    /// execution fault, record decoding fault). Propagated verbatim.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type for streamstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the canonical error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::Concurrency { .. } => "Concurrency",
            Error::InvalidState(_) => "InvalidState",
            Error::Store(_) => "Store",
        }
    }

    /// Check if this error is retryable.
    ///
    /// A concurrency conflict may succeed after the caller re-derives the
    /// version and retries the whole operation. Nothing is retried
    /// internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Concurrency { .. })
    }

    /// Check if this is a concurrency conflict.
    pub fn is_concurrency(&self) -> bool {
        matches!(self, Error::Concurrency { .. })
    }

    /// Check if this is a transaction-lifecycle error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_is_retryable() {
        let err = Error::Concurrency {
            index_key: "user-1:aggregate:a".to_string(),
            version: 3,
        };
        assert!(err.is_retryable());
        assert!(err.is_concurrency());
        assert_eq!(err.error_code(), "Concurrency");
    }

    #[test]
    fn store_error_is_not_retryable() {
        let err = Error::Store("connection reset".to_string());
        assert!(!err.is_retryable());
        assert_eq!(err.error_code(), "Store");
    }

    #[test]
    fn display_includes_context() {
        let err = Error::Concurrency {
            index_key: "s:aggregate:a1".to_string(),
            version: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("7"));
        assert!(msg.contains("s:aggregate:a1"));
    }

    #[test]
    fn invalid_state_code() {
        let err = Error::InvalidState("no active transaction".to_string());
        assert!(err.is_invalid_state());
        assert_eq!(err.error_code(), "InvalidState");
    }
}
