//! Typed record data model
//!
//! The in-memory representation of every persisted key, partitioned by
//! value type. Callers never hold a reference into the store's record;
//! values are copied in and out through typed accessors.

mod typed;
mod value;

pub use typed::TypedRecord;
pub use value::{PrefValue, Value, ValueKind};
