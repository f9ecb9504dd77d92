//! Preference store facade
//!
//! Ties the typed record, the codec and the durable writer together behind
//! one thread-safe handle per backing file.
//!
//! Decode failures never reach callers: a corrupt file is replaced with an
//! empty store and logged. Persist failures are returned, and the cache
//! keeps the mutation until the next successful persist.

mod config;
mod errors;
#[allow(clippy::module_inception)]
mod store;

pub use config::StoreConfig;
pub use errors::{PrefsResult, StoreError};
pub use store::Store;
