//! Crash test harness for subprocess management
//!
//! - Runs the `prefstore` binary against a data directory
//! - Injects crashes via `PREFSTORE_CRASH_POINT`
//! - Reads back post-crash file state

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Result of one CLI invocation
#[derive(Debug)]
pub struct CrashTestResult {
    /// Process did not exit successfully
    pub crashed: bool,
    pub exit_status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
}

impl CrashTestResult {
    /// True if the process stopped at the armed crash point
    pub fn hit_crash_point(&self, crash_point: &str) -> bool {
        self.crashed && self.stderr.contains(&format!("[CRASH] Triggering crash at point: {}", crash_point))
    }
}

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_prefstore")
}

fn execute(data_dir: &Path, args: &[&str], crash_point: Option<&str>) -> CrashTestResult {
    let mut command = Command::new(binary());
    command
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("PREFSTORE_CRASH_POINT")
        .env("PREFSTORE_LOG", "fatal");
    if let Some(point) = crash_point {
        command.env("PREFSTORE_CRASH_POINT", point);
    }

    match command.output() {
        Ok(output) => CrashTestResult {
            crashed: !output.status.success(),
            exit_status: Some(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        },
        Err(e) => CrashTestResult {
            crashed: true,
            exit_status: None,
            stdout: String::new(),
            stderr: format!("Failed to execute: {}", e),
        },
    }
}

/// Run a CLI command normally
pub fn execute_cli(data_dir: &Path, args: &[&str]) -> CrashTestResult {
    execute(data_dir, args, None)
}

/// Run a CLI command with a crash point armed
pub fn execute_with_crash_point(crash_point: &str, data_dir: &Path, args: &[&str]) -> CrashTestResult {
    execute(data_dir, args, Some(crash_point))
}

/// Default backing file inside `data_dir`
pub fn store_file(data_dir: &Path) -> PathBuf {
    data_dir.join("prefs.dat")
}

/// Sibling with `suffix` appended to the backing file name
pub fn sibling_file(data_dir: &Path, suffix: &str) -> PathBuf {
    data_dir.join(format!("prefs.dat{}", suffix))
}

/// Parse the backing file as JSON
pub fn read_snapshot(data_dir: &Path) -> serde_json::Value {
    let bytes = fs::read(store_file(data_dir)).expect("backing file must exist");
    serde_json::from_slice(&bytes).expect("backing file must be valid JSON")
}

/// Report crash test failure
pub fn report_failure(crash_point: &str, expected: &str, result: &CrashTestResult) {
    eprintln!("=== CRASH TEST FAILURE ===");
    eprintln!("Crash point: {}", crash_point);
    eprintln!("Expected: {}", expected);
    eprintln!("Exit status: {:?}", result.exit_status);
    eprintln!("stdout:\n{}", result.stdout);
    eprintln!("stderr:\n{}", result.stderr);
    eprintln!("==========================");
}
