//! Store facade
//!
//! Owns the single cached [`TypedRecord`] for one backing file and mirrors
//! it to disk through a [`DurableWriter`].
//!
//! # Lifecycle
//!
//! - Unloaded: nothing read yet. The first access loads the file, creating
//!   it empty when missing. A file that fails to decode is treated as
//!   corrupt: the cache starts empty and the file is rewritten empty.
//! - Loaded: the cache is the source of truth; the file is never re-read
//!   except after [`Store::overwrite_raw`].
//! - Unreadable: the file exists but could not be read. Reads see an empty
//!   record, mutations fail with `Io`, and every access retries the load.
//!   The file is never overwritten from this state.
//!
//! # Locking
//!
//! Cache access is serialized by one mutex. A persist encodes the cache and
//! takes a generation number under that mutex, then commits outside it, so
//! the file always ends on the newest committed generation. Lock order is
//! cache then commit, never the reverse.

use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::codec::Codec;
use crate::durable::DurableWriter;
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, MetricsSnapshot};
use crate::record::{PrefValue, TypedRecord, Value, ValueKind};

use super::config::StoreConfig;
use super::errors::{PrefsResult, StoreError};

#[derive(Debug, Default)]
struct CacheState {
    /// `None` until loaded, and again after a raw overwrite
    record: Option<TypedRecord>,
    /// Last generation handed to the writer
    generation: u64,
    /// Bumped on every cache mutation
    mutation_seq: u64,
    /// Highest `mutation_seq` known to be on disk
    committed_seq: u64,
}

/// Durable typed key-value store over one backing file.
///
/// Every typed operation exists for `String`, `i32`, `f32` and `bool`; the
/// type parameter selects the namespace.
///
/// ```ignore
/// let store = Store::open(StoreConfig::new(data_dir))?;
/// store.set("level", 3i32)?;
/// assert_eq!(store.get("level", 0i32), 3);
/// ```
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
    codec: Codec,
    writer: DurableWriter,
    state: Mutex<CacheState>,
    metrics: Arc<MetricsRegistry>,
}

fn validate_key(key: &str) -> PrefsResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

fn validate_value(key: &str, value: &Value) -> PrefsResult<()> {
    if let Value::Float(f) = value {
        if !f.is_finite() {
            return Err(StoreError::InvalidValue {
                key: key.to_string(),
                reason: format!("float {} is not finite", f),
            });
        }
    }
    Ok(())
}

impl Store {
    /// Validate `config` and create a store. No I/O happens until first use.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the configuration is rejected.
    pub fn open(config: StoreConfig) -> PrefsResult<Self> {
        config.validate()?;

        let metrics = Arc::new(MetricsRegistry::new());
        let writer = DurableWriter::new(config.path())
            .with_lock_timeout(config.lock_timeout())
            .with_retry_policy(config.retry_policy())
            .with_metrics(Arc::clone(&metrics));
        let codec = config.codec();

        log_event_with_fields(
            Event::StoreOpened,
            &[
                ("auto_save", &config.auto_save.to_string()),
                ("obfuscated", &codec.is_obfuscated().to_string()),
                ("path", &writer.path().display().to_string()),
            ],
        );

        Ok(Self {
            config,
            codec,
            writer,
            state: Mutex::new(CacheState::default()),
            metrics,
        })
    }

    /// Load the backing file now instead of on first access.
    ///
    /// # Errors
    ///
    /// `Io` when the file exists but cannot be read.
    pub fn load(&self) -> PrefsResult<()> {
        let mut state = self.state.lock();
        self.try_load(&mut state).map(|_| ())
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Stored value of type `T` for `key`, or `default` when absent
    pub fn get<T: PrefValue>(&self, key: &str, default: T) -> T {
        self.read(|record| record.get(key, default))
    }

    /// String convenience over [`Store::get`]
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.read(|record| {
            if record.has_typed::<String>(key) {
                record.get(key, String::new())
            } else {
                default.to_string()
            }
        })
    }

    /// Stored value for `key` in the namespace of `kind`
    pub fn get_value(&self, key: &str, kind: ValueKind) -> Option<Value> {
        self.read(|record| record.get_value(key, kind))
    }

    /// True if `key` exists in any namespace
    pub fn has(&self, key: &str) -> bool {
        self.read(|record| record.has(key))
    }

    /// True if `key` exists in the namespace of `T`
    pub fn has_typed<T: PrefValue>(&self, key: &str) -> bool {
        self.read(|record| record.has_typed::<T>(key))
    }

    pub fn has_kind(&self, key: &str, kind: ValueKind) -> bool {
        self.read(|record| record.has_kind(key, kind))
    }

    /// Distinct key names across all namespaces, sorted
    pub fn keys(&self) -> Vec<String> {
        self.read(|record| record.keys())
    }

    /// Every stored `(key, value)` pair
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.read(|record| record.entries())
    }

    /// Number of entries across all namespaces
    pub fn len(&self) -> usize {
        self.read(|record| record.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert or overwrite `key` in the namespace of `T`.
    ///
    /// Persists immediately when auto-save is on.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` / `InvalidValue`: nothing changed
    /// - `LockTimeout` / `CommitIo` / `Io`: the cache holds the new value but
    ///   the file does not, until the next successful persist
    pub fn set<T: PrefValue>(&self, key: &str, value: T) -> PrefsResult<()> {
        self.set_value(key, value.into_value())
    }

    /// Type-erased [`Store::set`]; the value's kind selects the namespace
    pub fn set_value(&self, key: &str, value: Value) -> PrefsResult<()> {
        validate_key(key)?;
        validate_value(key, &value)?;

        let mut state = self.state.lock();
        self.try_load(&mut state)?.set_value(key, value);
        state.mutation_seq += 1;
        self.persist(state, false)
    }

    /// Remove `key` from every namespace. Returns true if anything was removed.
    pub fn delete(&self, key: &str) -> PrefsResult<bool> {
        let mut state = self.state.lock();
        let removed = self.try_load(&mut state)?.delete(key);
        state.mutation_seq += 1;
        self.persist(state, false).map(|()| removed)
    }

    /// Remove `key` from the namespace of `T` only
    pub fn delete_typed<T: PrefValue>(&self, key: &str) -> PrefsResult<bool> {
        self.delete_kind(key, T::KIND)
    }

    pub fn delete_kind(&self, key: &str, kind: ValueKind) -> PrefsResult<bool> {
        let mut state = self.state.lock();
        let removed = self.try_load(&mut state)?.delete_kind(key, kind);
        state.mutation_seq += 1;
        self.persist(state, false).map(|()| removed)
    }

    /// Remove every key and persist, regardless of the auto-save setting
    pub fn delete_all(&self) -> PrefsResult<()> {
        let mut state = self.state.lock();
        state.record = Some(TypedRecord::new());
        state.mutation_seq += 1;
        log_event_with_fields(Event::DeleteAll, &[("path", &self.path_str())]);
        self.persist(state, true)
    }

    /// Persist the current cache regardless of the auto-save setting
    pub fn manual_save(&self) -> PrefsResult<()> {
        let state = self.state.lock();
        log_event_with_fields(Event::ManualSave, &[("path", &self.path_str())]);
        self.persist(state, true)
    }

    // ---------------------------------------------------------------------
    // Raw snapshots
    // ---------------------------------------------------------------------

    /// The persisted encoding, with obfuscation removed.
    ///
    /// Creates the file first if it does not exist yet. The result can be
    /// fed back to [`Store::overwrite_raw`].
    pub fn get_raw_snapshot(&self) -> PrefsResult<Vec<u8>> {
        let mut state = self.state.lock();
        self.try_load(&mut state)?;

        let bytes = self
            .writer
            .read_current()
            .map_err(|e| StoreError::io("failed to read snapshot", e))?
            .ok_or_else(|| {
                StoreError::io(
                    "failed to read snapshot",
                    io::Error::new(io::ErrorKind::NotFound, "backing file does not exist"),
                )
            })?;
        Ok(self.codec.unseal(bytes))
    }

    /// Replace the whole store with an encoded snapshot, bypassing the cache.
    ///
    /// `bytes` are written verbatim (obfuscated if configured) and the cache
    /// is dropped, so the next access reloads from disk. Bytes that do not
    /// decode are handled by the usual corruption recovery on that reload.
    pub fn overwrite_raw(&self, bytes: &[u8]) -> PrefsResult<()> {
        let mut state = self.state.lock();
        state.generation += 1;
        let generation = state.generation;

        self.writer
            .commit(generation, &self.codec.seal(bytes.to_vec()))?;

        state.record = None;
        state.committed_seq = state.mutation_seq;
        log_event_with_fields(
            Event::RawOverwrite,
            &[("bytes", &bytes.len().to_string()), ("path", &self.path_str())],
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Path of the previous-snapshot file kept by each commit
    pub fn backup_path(&self) -> &Path {
        self.writer.backup_path()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// True if the cache holds mutations not yet on disk
    pub fn is_dirty(&self) -> bool {
        let state = self.state.lock();
        state.mutation_seq != state.committed_seq
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn path_str(&self) -> String {
        self.writer.path().display().to_string()
    }

    /// The cached record, loading it first if needed.
    ///
    /// A failed read leaves the cache unloaded so the next access retries.
    fn try_load<'a>(&self, state: &'a mut CacheState) -> PrefsResult<&'a mut TypedRecord> {
        if state.record.is_none() {
            let record = self
                .load_from_disk(state)
                .map_err(|e| StoreError::io(format!("failed to read {}", self.path_str()), e))?;
            state.record = Some(record);
        }
        Ok(state.record.get_or_insert_with(TypedRecord::new))
    }

    /// Run `f` against the cached record, or an empty one if the file is
    /// unreadable
    fn read<R>(&self, f: impl FnOnce(&TypedRecord) -> R) -> R {
        let mut state = self.state.lock();
        match self.try_load(&mut state) {
            Ok(record) => f(record),
            Err(_) => f(&TypedRecord::new()),
        }
    }

    fn load_from_disk(&self, state: &mut CacheState) -> io::Result<TypedRecord> {
        self.metrics.increment_loads();
        let path = self.path_str();

        match self.writer.read_current() {
            Ok(Some(bytes)) => match self.codec.from_disk(&bytes) {
                Ok(record) => {
                    log_event_with_fields(
                        Event::StoreLoaded,
                        &[("entries", &record.len().to_string()), ("path", &path)],
                    );
                    Ok(record)
                }
                Err(e) => {
                    self.metrics.increment_recoveries();
                    log_event_with_fields(
                        Event::CorruptionRecovered,
                        &[("code", e.code()), ("error", &e.to_string()), ("path", &path)],
                    );
                    self.write_empty(state);
                    Ok(TypedRecord::new())
                }
            },
            Ok(None) => {
                log_event_with_fields(Event::FileCreated, &[("path", &path)]);
                self.write_empty(state);
                Ok(TypedRecord::new())
            }
            Err(e) => {
                // Unreadable is not corrupt; leave the file alone
                log_event_with_fields(
                    Event::LoadFailed,
                    &[("error", &e.to_string()), ("path", &path)],
                );
                Err(e)
            }
        }
    }

    fn write_empty(&self, state: &mut CacheState) {
        let result = self
            .codec
            .to_disk(&TypedRecord::new())
            .map_err(StoreError::from)
            .and_then(|bytes| {
                state.generation += 1;
                self.writer
                    .commit(state.generation, &bytes)
                    .map_err(StoreError::from)
            });

        if let Err(e) = result {
            state.mutation_seq += 1;
            Logger::error(
                "STORE_RESET_WRITE_FAILED",
                &[("code", e.code()), ("error", &e.to_string()), ("path", &self.path_str())],
            );
        }
    }

    /// Commit the cache if auto-save is on or `force` is set.
    ///
    /// Consumes the cache guard: the snapshot is encoded under it and
    /// committed after it is released.
    fn persist(&self, mut state: MutexGuard<'_, CacheState>, force: bool) -> PrefsResult<()> {
        if !force && !self.config.auto_save {
            return Ok(());
        }

        let bytes = {
            let record = self.try_load(&mut state)?;
            self.codec.to_disk(record)?
        };
        state.generation += 1;
        let generation = state.generation;
        let seq = state.mutation_seq;
        drop(state);

        // Committed or superseded by a newer snapshot holding these mutations
        self.writer.commit(generation, &bytes)?;

        let mut state = self.state.lock();
        state.committed_seq = state.committed_seq.max(seq);
        Ok(())
    }
}
