//! CLI module for prefstore
//!
//! Thin front end over [`Store`](crate::store::Store): one command per
//! invocation, one JSON object on stdout.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, KindArg};
pub use commands::{export, get, import, resolve_config, run, run_command, set};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
