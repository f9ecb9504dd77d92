//! Atomic, retrying snapshot writer
//!
//! Commit protocol:
//! 1. Write the buffer to `<file>.tmp` and fsync it
//! 2. Preserve the current file as `<file>.bak` (hard link, else copy)
//! 3. Rename `<file>.tmp` over `<file>` (atomic for readers), then fsync
//!    the parent directory
//!
//! The rename is retried under a bounded [`RetryPolicy`]. The whole protocol
//! runs under a per-writer lock acquired with a timeout; when the lock is
//! not acquired in time the write is skipped and reported, never queued.
//!
//! The lock is intra-process only. A second process writing the same path
//! is not guarded against.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::crash_point::{maybe_crash, points};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};

use super::errors::{DurableError, DurableResult};
use super::retry::RetryPolicy;

/// Default bound on waiting for the commit lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(500);

/// Suffix of the staging file
pub const TEMP_SUFFIX: &str = ".tmp";

/// Suffix of the previous-snapshot file
pub const BACKUP_SUFFIX: &str = ".bak";

/// What a commit call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Bytes are now the contents of the target file
    Committed { bytes: usize, attempts: u32 },
    /// A newer generation already reached disk; nothing was written
    Superseded { generation: u64, latest: u64 },
}

/// State guarded by the commit lock
#[derive(Debug, Default)]
pub(crate) struct CommitState {
    /// Highest generation whose replace step completed
    last_generation: u64,
}

/// Writes whole snapshots to one target path
#[derive(Debug)]
pub struct DurableWriter {
    target: PathBuf,
    temp: PathBuf,
    backup: PathBuf,
    lock_timeout: Duration,
    retry: RetryPolicy,
    commit_lock: Mutex<CommitState>,
    metrics: Arc<MetricsRegistry>,
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl DurableWriter {
    /// Create a writer for `target` with default timeout and retry policy
    pub fn new(target: impl Into<PathBuf>) -> Self {
        let target = target.into();
        Self {
            temp: sibling(&target, TEMP_SUFFIX),
            backup: sibling(&target, BACKUP_SUFFIX),
            target,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            retry: RetryPolicy::default(),
            commit_lock: Mutex::new(CommitState::default()),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Share a metrics registry with the owning store
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn path(&self) -> &Path {
        &self.target
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Read the target file. `Ok(None)` when it does not exist.
    pub fn read_current(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.target) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Commit `bytes` as snapshot `generation`.
    ///
    /// Generations must increase with cache order. A generation at or
    /// below the last committed one is reported as superseded without
    /// touching disk, so the file never regresses to an older snapshot.
    ///
    /// # Errors
    ///
    /// - `LockTimeout` if the commit lock is not acquired in time
    /// - `Io` if staging the temp file fails
    /// - `CommitIo` if the atomic replace fails on every attempt
    pub fn commit(&self, generation: u64, bytes: &[u8]) -> DurableResult<CommitOutcome> {
        let path_str = self.target.display().to_string();

        let Some(mut state) = self.commit_lock.try_lock_for(self.lock_timeout) else {
            self.metrics.increment_lock_timeouts();
            let waited_ms = self.lock_timeout.as_millis() as u64;
            log_event_with_fields(
                Event::LockTimeout,
                &[("path", &path_str), ("waited_ms", &waited_ms.to_string())],
            );
            return Err(DurableError::LockTimeout {
                path: self.target.clone(),
                waited_ms,
            });
        };

        if generation <= state.last_generation {
            self.metrics.increment_superseded();
            log_event_with_fields(
                Event::CommitSuperseded,
                &[
                    ("generation", &generation.to_string()),
                    ("latest", &state.last_generation.to_string()),
                    ("path", &path_str),
                ],
            );
            return Ok(CommitOutcome::Superseded {
                generation,
                latest: state.last_generation,
            });
        }

        maybe_crash(points::COMMIT_BEFORE_TEMP_WRITE);
        self.stage(bytes)?;
        maybe_crash(points::COMMIT_AFTER_TEMP_WRITE);

        self.preserve_backup();
        maybe_crash(points::COMMIT_AFTER_BACKUP);

        let attempts = match self.retry.run(
            |_| self.replace(),
            |attempt, e| {
                self.metrics.increment_retries();
                log_event_with_fields(
                    Event::CommitRetry,
                    &[
                        ("attempt", &attempt.to_string()),
                        ("error", &e.to_string()),
                        ("path", &path_str),
                    ],
                );
            },
        ) {
            Ok(((), attempts)) => attempts,
            Err((source, attempts)) => {
                self.metrics.increment_failures();
                log_event_with_fields(
                    Event::CommitFailed,
                    &[
                        ("attempts", &attempts.to_string()),
                        ("error", &source.to_string()),
                        ("path", &path_str),
                    ],
                );
                let _ = fs::remove_file(&self.temp);
                return Err(DurableError::CommitIo {
                    path: self.target.clone(),
                    attempts,
                    source,
                });
            }
        };
        maybe_crash(points::COMMIT_AFTER_REPLACE);

        state.last_generation = generation;
        self.metrics.record_commit(bytes.len() as u64);
        log_event_with_fields(
            Event::CommitComplete,
            &[
                ("bytes", &bytes.len().to_string()),
                ("generation", &generation.to_string()),
                ("path", &path_str),
            ],
        );

        Ok(CommitOutcome::Committed {
            bytes: bytes.len(),
            attempts,
        })
    }

    /// Hold the commit lock, so concurrent commits time out
    #[cfg(test)]
    pub(crate) fn hold_commit_lock(&self) -> parking_lot::MutexGuard<'_, CommitState> {
        self.commit_lock.lock()
    }

    /// Step 1: write and fsync the temp file. The target is untouched.
    fn stage(&self, bytes: &[u8]) -> DurableResult<()> {
        if let Some(parent) = self.target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    DurableError::io(
                        format!("failed to create directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp)
            .map_err(|e| {
                DurableError::io(
                    format!("failed to create temp file {}", self.temp.display()),
                    e,
                )
            })?;

        file.write_all(bytes).map_err(|e| {
            DurableError::io(
                format!("failed to write temp file {}", self.temp.display()),
                e,
            )
        })?;

        // fsync before the rename makes the new contents visible
        file.sync_all().map_err(|e| {
            DurableError::io(
                format!("failed to fsync temp file {}", self.temp.display()),
                e,
            )
        })?;

        Ok(())
    }

    /// Keep the current target as the backup snapshot. Best-effort.
    fn preserve_backup(&self) {
        if !self.target.is_file() {
            return;
        }

        match fs::remove_file(&self.backup) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                Logger::warn(
                    "BACKUP_SKIPPED",
                    &[("error", &e.to_string()), ("path", &self.backup.display().to_string())],
                );
                return;
            }
        }

        let result = fs::hard_link(&self.target, &self.backup)
            .or_else(|_| fs::copy(&self.target, &self.backup).map(|_| ()));
        if let Err(e) = result {
            Logger::warn(
                "BACKUP_SKIPPED",
                &[("error", &e.to_string()), ("path", &self.backup.display().to_string())],
            );
        }
    }

    /// Step 2: atomically move the temp file over the target
    fn replace(&self) -> io::Result<()> {
        fs::rename(&self.temp, &self.target)?;

        // Make the rename itself durable; not supported everywhere
        if let Some(parent) = self.target.parent() {
            let dir = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let Ok(dir) = File::open(dir) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;
    use tempfile::TempDir;

    fn writer_in(dir: &TempDir) -> DurableWriter {
        DurableWriter::new(dir.path().join("prefs.dat"))
    }

    #[test]
    fn test_sibling_paths() {
        let writer = DurableWriter::new("/data/prefs.dat");
        assert_eq!(writer.temp_path(), Path::new("/data/prefs.dat.tmp"));
        assert_eq!(writer.backup_path(), Path::new("/data/prefs.dat.bak"));
    }

    #[test]
    fn test_commit_writes_target() {
        let dir = TempDir::new().unwrap();
        let writer = writer_in(&dir);

        let outcome = writer.commit(1, b"first").unwrap();
        assert_eq!(outcome, CommitOutcome::Committed { bytes: 5, attempts: 1 });
        assert_eq!(fs::read(writer.path()).unwrap(), b"first");
        assert!(!writer.temp_path().exists());
        assert!(!writer.backup_path().exists());
    }

    #[test]
    fn test_commit_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let writer = DurableWriter::new(dir.path().join("nested/deeper/prefs.dat"));

        writer.commit(1, b"data").unwrap();
        assert_eq!(writer.read_current().unwrap(), Some(b"data".to_vec()));
    }

    #[test]
    fn test_backup_holds_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let writer = writer_in(&dir);

        writer.commit(1, b"one").unwrap();
        writer.commit(2, b"two").unwrap();
        assert_eq!(fs::read(writer.backup_path()).unwrap(), b"one");

        writer.commit(3, b"three").unwrap();
        assert_eq!(fs::read(writer.backup_path()).unwrap(), b"two");
        assert_eq!(fs::read(writer.path()).unwrap(), b"three");
    }

    #[test]
    fn test_read_current_missing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(writer_in(&dir).read_current().unwrap(), None);
    }

    #[test]
    fn test_older_generation_superseded() {
        let dir = TempDir::new().unwrap();
        let metrics = Arc::new(MetricsRegistry::new());
        let writer = writer_in(&dir).with_metrics(Arc::clone(&metrics));

        writer.commit(5, b"newer").unwrap();
        let outcome = writer.commit(4, b"older").unwrap();

        assert_eq!(outcome, CommitOutcome::Superseded { generation: 4, latest: 5 });
        assert_eq!(fs::read(writer.path()).unwrap(), b"newer");
        assert_eq!(metrics.snapshot().commits, 1);
        assert_eq!(metrics.snapshot().commits_superseded, 1);
    }

    #[test]
    fn test_interrupted_after_stage_leaves_target_intact() {
        let dir = TempDir::new().unwrap();
        let writer = writer_in(&dir);
        writer.commit(1, b"original").unwrap();

        // Step 1 completes, step 2 never runs
        writer.stage(b"half-finished update").unwrap();

        assert_eq!(fs::read(writer.path()).unwrap(), b"original");
        assert!(writer.temp_path().exists());

        // A later commit overwrites the stale temp file
        writer.commit(2, b"next").unwrap();
        assert_eq!(fs::read(writer.path()).unwrap(), b"next");
        assert!(!writer.temp_path().exists());
    }

    #[test]
    fn test_lock_timeout_skips_write() {
        let dir = TempDir::new().unwrap();
        let metrics = Arc::new(MetricsRegistry::new());
        let writer = writer_in(&dir)
            .with_lock_timeout(Duration::from_millis(50))
            .with_metrics(Arc::clone(&metrics));

        let guard = writer.commit_lock.lock();
        let result = thread::scope(|s| s.spawn(|| writer.commit(1, b"blocked")).join().unwrap());
        drop(guard);

        match result {
            Err(DurableError::LockTimeout { waited_ms, .. }) => assert_eq!(waited_ms, 50),
            other => panic!("expected lock timeout, got {:?}", other),
        }
        assert!(!writer.path().exists());
        assert_eq!(metrics.snapshot().lock_timeouts, 1);

        // The skipped generation can still be committed later
        writer.commit(1, b"retried").unwrap();
        assert_eq!(fs::read(writer.path()).unwrap(), b"retried");
    }

    #[test]
    fn test_replace_failure_exhausts_retries() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("prefs.dat");
        // A non-empty directory cannot be replaced by a file
        fs::create_dir_all(target.join("occupied")).unwrap();

        let metrics = Arc::new(MetricsRegistry::new());
        let writer = DurableWriter::new(&target)
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
            .with_metrics(Arc::clone(&metrics));

        let start = Instant::now();
        let err = writer.commit(1, b"data").unwrap_err();

        match err {
            DurableError::CommitIo { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected commit failure, got {:?}", other),
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!writer.temp_path().exists());
        assert!(target.is_dir());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commit_retries, 2);
        assert_eq!(snapshot.commit_failures, 1);
        assert_eq!(snapshot.commits, 0);
    }

    #[test]
    fn test_concurrent_commits_end_on_newest_generation() {
        let dir = TempDir::new().unwrap();
        let writer = writer_in(&dir).with_lock_timeout(Duration::from_secs(10));

        thread::scope(|s| {
            for generation in 1..=16u64 {
                let writer = &writer;
                s.spawn(move || {
                    writer
                        .commit(generation, generation.to_string().as_bytes())
                        .unwrap();
                });
            }
        });

        assert_eq!(fs::read(writer.path()).unwrap(), b"16");
    }
}
