//! prefstore CLI entry point
//!
//! Parses arguments and runs one command via `cli::run`. The JSON response
//! (or error) is already on stdout when this returns; failures additionally
//! go to stderr with a non-zero exit status.

use prefstore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
