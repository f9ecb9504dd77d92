//! Store configuration
//!
//! Loaded from a JSON file or built in code. Validated before the store
//! touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::{Codec, Formatting};
use crate::durable::{RetryPolicy, DEFAULT_LOCK_TIMEOUT, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

use super::errors::{PrefsResult, StoreError};

/// Configuration for one store instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Application-specific writable directory (required)
    pub data_dir: PathBuf,

    /// Backing file name inside `data_dir`
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Persist on every mutation (default true)
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,

    /// Indented output; no semantic effect
    #[serde(default)]
    pub pretty_print: bool,

    /// XOR-obfuscate the persisted bytes
    #[serde(default)]
    pub obfuscate: bool,

    /// Key for obfuscation; required and non-empty when `obfuscate` is set
    #[serde(default)]
    pub obfuscation_key: Option<String>,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_file_name() -> String {
    "prefs.dat".to_string()
}
fn default_auto_save() -> bool {
    true
}
fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT.as_millis() as u64
}
fn default_retry_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY.as_millis() as u64
}

impl StoreConfig {
    /// Defaults for everything except the data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: default_file_name(),
            auto_save: default_auto_save(),
            pretty_print: false,
            obfuscate: false,
            obfuscation_key: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> PrefsResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::config(format!("failed to read {}: {}", path.display(), e)))?;

        let config: StoreConfig = serde_json::from_str(&content)
            .map_err(|e| StoreError::config(format!("invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Enable obfuscation with `key`
    pub fn with_obfuscation(mut self, key: impl Into<String>) -> Self {
        self.obfuscate = true;
        self.obfuscation_key = Some(key.into());
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Reject configurations that cannot work, before any I/O
    pub fn validate(&self) -> PrefsResult<()> {
        if self.file_name.is_empty() {
            return Err(StoreError::config("file_name must not be empty"));
        }
        if self.file_name == "." || self.file_name == ".." {
            return Err(StoreError::config(format!(
                "file_name '{}' is not a file",
                self.file_name
            )));
        }
        if self.file_name.contains('/') || self.file_name.contains('\\') {
            return Err(StoreError::config(format!(
                "file_name '{}' must not contain a path separator",
                self.file_name
            )));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(StoreError::config("data_dir must not be empty"));
        }
        if self.obfuscate && self.obfuscation_key.as_deref().map_or(true, str::is_empty) {
            return Err(StoreError::config(
                "obfuscation enabled but obfuscation_key is empty",
            ));
        }
        if self.retry_attempts == 0 {
            return Err(StoreError::config("retry_attempts must be > 0"));
        }
        Ok(())
    }

    /// Full path of the backing file
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    /// Codec matching the formatting and obfuscation settings
    pub fn codec(&self) -> Codec {
        let codec = Codec::new(Formatting::from_pretty(self.pretty_print));
        match (self.obfuscate, self.obfuscation_key.as_deref()) {
            (true, Some(key)) => codec.with_obfuscation(key),
            _ => codec,
        }
    }
}
