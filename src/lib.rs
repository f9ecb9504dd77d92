//! prefstore - an embedded, durable, typed key-value store
//!
//! Small application state (settings, progress flags, counters) kept in one
//! file, partitioned into string, integer, float and boolean namespaces.
//!
//! - `record`: in-memory typed record
//! - `codec`: JSON encoding and optional XOR obfuscation
//! - `durable`: atomic, retrying, lock-bounded file replacement
//! - `store`: the facade applications use
//!
//! ```ignore
//! use prefstore::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("/var/lib/mygame"))?;
//! store.set("level", 3i32)?;
//! assert_eq!(store.get("level", 0i32), 3);
//! ```

pub mod cli;
pub mod codec;
pub mod crash_point;
pub mod durable;
pub mod observability;
pub mod record;
pub mod store;

pub use record::{PrefValue, TypedRecord, Value, ValueKind};
pub use store::{PrefsResult, Store, StoreConfig, StoreError};
