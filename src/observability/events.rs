//! Observable store lifecycle events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in the store lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Store handle opened (configuration validated)
    StoreOpened,
    /// Backing file loaded into the cache
    StoreLoaded,
    /// Backing file did not exist and was created empty
    FileCreated,
    /// Backing file could not be read
    LoadFailed,
    /// Backing file failed to decode and was reset
    CorruptionRecovered,

    /// Snapshot committed to disk
    CommitComplete,
    /// Older snapshot skipped because a newer one already committed
    CommitSuperseded,
    /// Atomic replace failed and will be retried
    CommitRetry,
    /// Atomic replace failed after exhausting retries
    CommitFailed,
    /// Commit lock not acquired in time
    LockTimeout,

    /// Every key removed
    DeleteAll,
    /// Raw snapshot replaced out-of-band
    RawOverwrite,
    /// Explicit save requested
    ManualSave,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreLoaded => "STORE_LOADED",
            Event::FileCreated => "STORE_FILE_CREATED",
            Event::LoadFailed => "STORE_LOAD_FAILED",
            Event::CorruptionRecovered => "STORE_CORRUPTION_RECOVERED",

            Event::CommitComplete => "COMMIT_COMPLETE",
            Event::CommitSuperseded => "COMMIT_SUPERSEDED",
            Event::CommitRetry => "COMMIT_RETRY",
            Event::CommitFailed => "COMMIT_FAILED",
            Event::LockTimeout => "COMMIT_LOCK_TIMEOUT",

            Event::DeleteAll => "STORE_DELETE_ALL",
            Event::RawOverwrite => "STORE_RAW_OVERWRITE",
            Event::ManualSave => "STORE_MANUAL_SAVE",
        }
    }

    /// Returns true if this event reports a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::LoadFailed | Event::CommitFailed | Event::LockTimeout
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
