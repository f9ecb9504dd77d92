//! Durable snapshot writer
//!
//! Commits a byte buffer to the backing file so that a reader never sees a
//! partially written file, retrying transient replace failures a bounded
//! number of times.
//!
//! # Guarantees
//!
//! - The target is only ever changed by an atomic rename
//! - The previous snapshot is kept as `<file>.bak` after each commit
//! - Older snapshots never overwrite newer ones
//! - Lock waits are bounded; a timed-out write is reported, not queued

mod errors;
mod retry;
mod writer;

pub use errors::{DurableError, DurableResult};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use writer::{CommitOutcome, DurableWriter, BACKUP_SUFFIX, DEFAULT_LOCK_TIMEOUT, TEMP_SUFFIX};
