//! In-memory typed record
//!
//! Four independent mappings, one per value type. A key name may exist in
//! several mappings at once; each mapping is its own namespace. Mappings are
//! ordered so that encoding a record is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::value::{PrefValue, Value, ValueKind};

/// Snapshot of all persisted keys, partitioned by value type.
///
/// Performs no I/O; the store owns exactly one of these as its cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedRecord {
    #[serde(default)]
    pub(crate) strings: BTreeMap<String, String>,
    #[serde(default)]
    pub(crate) ints: BTreeMap<String, i32>,
    #[serde(default)]
    pub(crate) floats: BTreeMap<String, f32>,
    #[serde(default)]
    pub(crate) bools: BTreeMap<String, bool>,
}

impl TypedRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `key` exists in any namespace
    pub fn has(&self, key: &str) -> bool {
        ValueKind::ALL.iter().any(|kind| self.has_kind(key, *kind))
    }

    /// True if `key` exists in the namespace of `T`
    pub fn has_typed<T: PrefValue>(&self, key: &str) -> bool {
        T::mapping(self).contains_key(key)
    }

    /// True if `key` exists in the namespace of `kind`
    pub fn has_kind(&self, key: &str, kind: ValueKind) -> bool {
        match kind {
            ValueKind::String => self.strings.contains_key(key),
            ValueKind::Int => self.ints.contains_key(key),
            ValueKind::Float => self.floats.contains_key(key),
            ValueKind::Bool => self.bools.contains_key(key),
        }
    }

    /// Stored value for `key`, or `default` when absent
    pub fn get<T: PrefValue>(&self, key: &str, default: T) -> T {
        T::mapping(self).get(key).cloned().unwrap_or(default)
    }

    /// Stored value for `key` in the namespace of `kind`
    pub fn get_value(&self, key: &str, kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::String => self.strings.get(key).cloned().map(Value::Str),
            ValueKind::Int => self.ints.get(key).copied().map(Value::Int),
            ValueKind::Float => self.floats.get(key).copied().map(Value::Float),
            ValueKind::Bool => self.bools.get(key).copied().map(Value::Bool),
        }
    }

    /// Insert or overwrite `key` in the namespace of `T`
    pub fn set<T: PrefValue>(&mut self, key: &str, value: T) {
        T::mapping_mut(self).insert(key.to_string(), value);
    }

    /// Insert or overwrite `key` in the namespace of the value's kind
    pub fn set_value(&mut self, key: &str, value: Value) {
        match value {
            Value::Str(v) => self.set(key, v),
            Value::Int(v) => self.set(key, v),
            Value::Float(v) => self.set(key, v),
            Value::Bool(v) => self.set(key, v),
        }
    }

    /// Remove `key` from every namespace.
    ///
    /// Returns true if anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let mut removed = false;
        for kind in ValueKind::ALL {
            removed |= self.delete_kind(key, kind);
        }
        removed
    }

    /// Remove `key` from the namespace of `T` only
    pub fn delete_typed<T: PrefValue>(&mut self, key: &str) -> bool {
        T::mapping_mut(self).remove(key).is_some()
    }

    /// Remove `key` from the namespace of `kind` only
    pub fn delete_kind(&mut self, key: &str, kind: ValueKind) -> bool {
        match kind {
            ValueKind::String => self.strings.remove(key).is_some(),
            ValueKind::Int => self.ints.remove(key).is_some(),
            ValueKind::Float => self.floats.remove(key).is_some(),
            ValueKind::Bool => self.bools.remove(key).is_some(),
        }
    }

    /// Empty all four namespaces
    pub fn reset_all(&mut self) {
        self.strings.clear();
        self.ints.clear();
        self.floats.clear();
        self.bools.clear();
    }

    /// Number of entries across all namespaces
    pub fn len(&self) -> usize {
        self.strings.len() + self.ints.len() + self.floats.len() + self.bools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct key names across all namespaces, sorted
    pub fn keys(&self) -> Vec<String> {
        let keys: BTreeSet<&String> = self
            .strings
            .keys()
            .chain(self.ints.keys())
            .chain(self.floats.keys())
            .chain(self.bools.keys())
            .collect();
        keys.into_iter().cloned().collect()
    }

    /// Every `(key, value)` pair, grouped by namespace
    pub fn entries(&self) -> Vec<(String, Value)> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.strings.iter().map(|(k, v)| (k.clone(), Value::Str(v.clone()))));
        out.extend(self.ints.iter().map(|(k, v)| (k.clone(), Value::Int(*v))));
        out.extend(self.floats.iter().map(|(k, v)| (k.clone(), Value::Float(*v))));
        out.extend(self.bools.iter().map(|(k, v)| (k.clone(), Value::Bool(*v))));
        out
    }
}
