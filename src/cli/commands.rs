//! CLI command implementations
//!
//! Each invocation opens one store, runs one command against it and
//! prints one JSON response. Commands return their response payload so
//! they can be driven without a process.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::codec;
use crate::record::{Value, ValueKind};
use crate::store::{Store, StoreConfig};

use super::args::{Cli, Command, KindArg};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, runs the command and writes the response. Errors are
/// written as an error response and also returned so main.rs can exit
/// non-zero.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    let result = resolve_config(&cli)
        .and_then(|config| Store::open(config).map_err(CliError::from))
        .and_then(|store| run_command(&store, cli.command));

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Build the store configuration from `--config` and the override flags
pub fn resolve_config(cli: &Cli) -> CliResult<StoreConfig> {
    let mut config = match (&cli.config, &cli.data_dir) {
        (Some(path), _) => StoreConfig::load(path)?,
        (None, Some(dir)) => StoreConfig::new(dir),
        (None, None) => {
            return Err(CliError::config_error(
                "either --config or --data-dir is required",
            ))
        }
    };

    if let (Some(_), Some(dir)) = (&cli.config, &cli.data_dir) {
        config.data_dir = dir.clone();
    }
    if let Some(file) = &cli.file {
        config.file_name = file.clone();
    }
    if cli.pretty {
        config.pretty_print = true;
    }
    if let Some(key) = &cli.obfuscation_key {
        config = config.with_obfuscation(key.clone());
    }

    Ok(config)
}

/// Run one command against an open store
pub fn run_command(store: &Store, cmd: Command) -> CliResult<serde_json::Value> {
    match cmd {
        Command::Set { key, value, kind } => set(store, &key, &value, kind),
        Command::Get { key, kind, default } => get(store, &key, kind.into(), default.as_deref()),
        Command::Has { key, kind } => {
            let exists = match kind {
                Some(kind) => store.has_kind(&key, kind.into()),
                None => store.has(&key),
            };
            Ok(json!({"key": key, "exists": exists}))
        }
        Command::Delete { key, kind } => {
            let deleted = match kind {
                Some(kind) => store.delete_kind(&key, kind.into())?,
                None => store.delete(&key)?,
            };
            Ok(json!({"key": key, "deleted": deleted}))
        }
        Command::DeleteAll => {
            store.delete_all()?;
            Ok(json!({"deleted_all": true}))
        }
        Command::List => Ok(list(store)),
        Command::Export { output } => export(store, output.as_deref()),
        Command::Import { file } => import(store, &file),
        Command::Path => Ok(json!({
            "path": store.path().display().to_string(),
            "backup": store.backup_path().display().to_string(),
            "exists": store.path().exists(),
        })),
        Command::Metrics => {
            store.load()?;
            Ok(serde_json::to_value(store.metrics())?)
        }
    }
}

fn parse_value(text: &str, kind: ValueKind) -> CliResult<Value> {
    Value::parse_as(text, kind).ok_or_else(|| {
        CliError::invalid_argument(format!("'{}' is not a valid {} value", text, kind))
    })
}

fn entry(key: &str, value: &Value) -> serde_json::Value {
    json!({"key": key, "type": value.kind().as_str(), "value": value})
}

/// Set a key, inferring the type unless one is given
pub fn set(store: &Store, key: &str, text: &str, kind: Option<KindArg>) -> CliResult<serde_json::Value> {
    let value = match kind {
        Some(kind) => parse_value(text, kind.into())?,
        None => Value::infer(text),
    };
    store.set_value(key, value.clone())?;
    Ok(entry(key, &value))
}

/// Read a key, falling back to `default` or the type's zero value
pub fn get(
    store: &Store,
    key: &str,
    kind: ValueKind,
    default: Option<&str>,
) -> CliResult<serde_json::Value> {
    let (value, found) = match store.get_value(key, kind) {
        Some(value) => (value, true),
        None => match default {
            Some(text) => (parse_value(text, kind)?, false),
            None => (Value::zero(kind), false),
        },
    };

    let mut response = entry(key, &value);
    response["found"] = json!(found);
    Ok(response)
}

fn list(store: &Store) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = store
        .entries()
        .iter()
        .map(|(key, value)| entry(key, value))
        .collect();
    json!({"count": entries.len(), "entries": entries})
}

/// Print the plain snapshot, or write it to `output`
pub fn export(store: &Store, output: Option<&Path>) -> CliResult<serde_json::Value> {
    let bytes = store.get_raw_snapshot()?;

    match output {
        Some(path) => {
            fs::write(path, &bytes).map_err(|e| {
                CliError::io_error(format!("failed to write {}: {}", path.display(), e))
            })?;
            Ok(json!({"output": path.display().to_string(), "bytes": bytes.len()}))
        }
        None => {
            let snapshot: serde_json::Value = serde_json::from_slice(&bytes)?;
            Ok(json!({"snapshot": snapshot}))
        }
    }
}

/// Replace the store with a snapshot file.
///
/// The file is decoded first so a bad import is refused instead of being
/// written and then recovered as corrupt.
pub fn import(store: &Store, file: &Path) -> CliResult<serde_json::Value> {
    let bytes = fs::read(file)
        .map_err(|e| CliError::io_error(format!("failed to read {}: {}", file.display(), e)))?;

    codec::decode(&bytes).map_err(|e| {
        CliError::invalid_argument(format!("{} is not a valid snapshot: {}", file.display(), e))
    })?;

    store.overwrite_raw(&bytes)?;
    Ok(json!({
        "imported": file.display().to_string(),
        "bytes": bytes.len(),
        "keys": store.keys().len(),
    }))
}
