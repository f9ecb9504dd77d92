//! Durable write error types
//!
//! Error codes:
//! - PREFS_LOCK_TIMEOUT (ERROR severity, non-fatal: the write was skipped)
//! - PREFS_COMMIT_IO (FATAL for the attempted persist)
//! - PREFS_IO (ERROR severity)

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to commit a snapshot to disk
#[derive(Debug, Error)]
pub enum DurableError {
    /// Commit lock not acquired within the bound; nothing was written
    #[error("commit lock for {} not acquired within {waited_ms} ms", .path.display())]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    /// Atomic replace kept failing until the retry budget ran out
    #[error("atomic replace of {} failed after {attempts} attempts: {source}", .path.display())]
    CommitIo {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    /// Staging I/O failed before the replace step
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl DurableError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        DurableError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DurableError::LockTimeout { .. } => "PREFS_LOCK_TIMEOUT",
            DurableError::CommitIo { .. } => "PREFS_COMMIT_IO",
            DurableError::Io { .. } => "PREFS_IO",
        }
    }

    /// True when the persist attempt is definitively lost
    pub fn is_fatal(&self) -> bool {
        matches!(self, DurableError::CommitIo { .. })
    }
}

/// Result type for durable write operations
pub type DurableResult<T> = Result<T, DurableError>;
