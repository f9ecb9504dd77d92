//! Crash point injection for testing durability
//!
//! Crash points are enabled via the `PREFSTORE_CRASH_POINT` environment
//! variable. When the named point is reached, the process terminates via
//! `std::process::abort()`: no cleanup, no unwinding, no catching.
//!
//! # Usage
//!
//! ```ignore
//! use prefstore::crash_point::{maybe_crash, points};
//!
//! maybe_crash(points::COMMIT_AFTER_TEMP_WRITE);
//! ```
//!
//! # Testing
//!
//! ```bash
//! PREFSTORE_CRASH_POINT=commit_after_temp_write prefstore --data-dir /tmp/p set level 3
//! ```

use std::sync::OnceLock;

/// Environment variable naming the active crash point
pub const CRASH_POINT_ENV: &str = "PREFSTORE_CRASH_POINT";

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn get_crash_point() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var(CRASH_POINT_ENV).ok())
        .as_deref()
}

/// Check if a specific crash point is enabled
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    get_crash_point().map(|p| p == name).unwrap_or(false)
}

/// Abort the process if the named crash point is enabled.
///
/// No-op when `PREFSTORE_CRASH_POINT` is unset or names another point.
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    pub const COMMIT_BEFORE_TEMP_WRITE: &str = "commit_before_temp_write";
    pub const COMMIT_AFTER_TEMP_WRITE: &str = "commit_after_temp_write";
    pub const COMMIT_AFTER_BACKUP: &str = "commit_after_backup";
    pub const COMMIT_AFTER_REPLACE: &str = "commit_after_replace";

    /// Get all crash point names
    pub fn all() -> &'static [&'static str] {
        &[
            COMMIT_BEFORE_TEMP_WRITE,
            COMMIT_AFTER_TEMP_WRITE,
            COMMIT_AFTER_BACKUP,
            COMMIT_AFTER_REPLACE,
        ]
    }
}
