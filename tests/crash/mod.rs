//! Crash testing support
//!
//! Drives the `prefstore` binary in a subprocess with a crash point armed,
//! then inspects the files it left behind.

pub mod harness;

pub use harness::*;
