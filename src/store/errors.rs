//! Store error types
//!
//! Read-path failures (undecodable snapshots) never reach the caller; the
//! store recovers by resetting. Only write-path and configuration failures
//! are represented here.
//!
//! Error codes:
//! - PREFS_INVALID_CONFIGURATION
//! - PREFS_INVALID_KEY
//! - PREFS_INVALID_VALUE
//! - PREFS_LOCK_TIMEOUT
//! - PREFS_COMMIT_IO
//! - PREFS_IO
//! - PREFS_ENCODE_*

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::EncodeError;
use crate::durable::DurableError;

/// Errors surfaced by [`Store`](super::Store) operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration rejected before any I/O
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Key names must be non-empty
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Value cannot be persisted losslessly
    #[error("invalid value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// Commit lock not acquired in time; the cache keeps the mutation
    #[error("commit lock for {} not acquired within {waited_ms} ms", .path.display())]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    /// Atomic replace failed after exhausting retries
    #[error("atomic replace of {} failed after {attempts} attempts: {source}", .path.display())]
    CommitIo {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        StoreError::InvalidConfiguration(message.into())
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidConfiguration(_) => "PREFS_INVALID_CONFIGURATION",
            StoreError::InvalidKey(_) => "PREFS_INVALID_KEY",
            StoreError::InvalidValue { .. } => "PREFS_INVALID_VALUE",
            StoreError::LockTimeout { .. } => "PREFS_LOCK_TIMEOUT",
            StoreError::CommitIo { .. } => "PREFS_COMMIT_IO",
            StoreError::Io { .. } => "PREFS_IO",
            StoreError::Encode(e) => e.code(),
        }
    }

    /// True when the cache may be ahead of the file after this error
    pub fn is_persist_failure(&self) -> bool {
        matches!(
            self,
            StoreError::LockTimeout { .. } | StoreError::CommitIo { .. } | StoreError::Io { .. }
        )
    }
}

impl From<DurableError> for StoreError {
    fn from(e: DurableError) -> Self {
        match e {
            DurableError::LockTimeout { path, waited_ms } => {
                StoreError::LockTimeout { path, waited_ms }
            }
            DurableError::CommitIo {
                path,
                attempts,
                source,
            } => StoreError::CommitIo {
                path,
                attempts,
                source,
            },
            DurableError::Io { context, source } => StoreError::Io { context, source },
        }
    }
}

/// Result type for store operations
pub type PrefsResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durable_errors_keep_their_code() {
        let durable = DurableError::LockTimeout {
            path: PathBuf::from("p"),
            waited_ms: 500,
        };
        let code = durable.code();
        let store: StoreError = durable.into();
        assert_eq!(store.code(), code);
        assert!(store.is_persist_failure());
    }

    #[test]
    fn test_validation_errors_are_not_persist_failures() {
        assert!(!StoreError::InvalidKey("empty".into()).is_persist_failure());
        assert!(!StoreError::config("bad").is_persist_failure());
    }

    #[test]
    fn test_encode_error_code_passthrough() {
        let err: StoreError = EncodeError::NonFiniteFloat("x".into()).into();
        assert_eq!(err.code(), "PREFS_ENCODE_NON_FINITE");
    }

    #[test]
    fn test_display() {
        let err = StoreError::InvalidValue {
            key: "speed".into(),
            reason: "float must be finite".into(),
        };
        assert_eq!(err.to_string(), "invalid value for key 'speed': float must be finite");
    }
}
