//! CLI argument definitions using clap
//!
//! Commands:
//! - prefstore set <key> <value> [--type T]
//! - prefstore get <key> --type T [--default V]
//! - prefstore has <key> [--type T]
//! - prefstore delete <key> [--type T]
//! - prefstore delete-all
//! - prefstore list
//! - prefstore export [--output FILE]
//! - prefstore import <FILE>
//! - prefstore path
//! - prefstore metrics

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::record::ValueKind;

/// prefstore - durable typed key-value preferences
#[derive(Parser, Debug)]
#[command(name = "prefstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides the configuration file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Backing file name inside the data directory
    #[arg(long, global = true)]
    pub file: Option<String>,

    /// Write indented JSON
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Obfuscate the file with this key
    #[arg(long, global = true)]
    pub obfuscation_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Value type selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    String,
    Int,
    Float,
    Bool,
}

impl From<KindArg> for ValueKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::String => ValueKind::String,
            KindArg::Int => ValueKind::Int,
            KindArg::Float => ValueKind::Float,
            KindArg::Bool => ValueKind::Bool,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set a key; the type is inferred unless --type is given
    Set {
        key: String,
        value: String,
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },

    /// Read a key from one namespace
    Get {
        key: String,
        #[arg(long = "type", value_enum)]
        kind: KindArg,
        /// Returned when the key is absent
        #[arg(long)]
        default: Option<String>,
    },

    /// Check whether a key exists
    Has {
        key: String,
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },

    /// Delete a key from every namespace, or only from --type
    Delete {
        key: String,
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },

    /// Delete every key
    DeleteAll,

    /// List every key and value
    List,

    /// Print the persisted encoding, or write it to --output
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the store with an encoded snapshot file
    Import { file: PathBuf },

    /// Print the backing file path
    Path,

    /// Print store counters for this invocation
    Metrics,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
