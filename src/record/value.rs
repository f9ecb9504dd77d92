//! Value types a record can hold
//!
//! Four value types are supported, each stored in its own namespace:
//! strings, 32-bit integers, single-precision floats and booleans.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::typed::TypedRecord;

/// Tag identifying one of the four value namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
}

impl ValueKind {
    /// All kinds, in encoding order
    pub const ALL: [ValueKind; 4] = [
        ValueKind::String,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Bool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
        }
    }

    /// Parse a kind name (`string`, `int`, `float`, `bool`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "str" => Some(ValueKind::String),
            "int" | "i32" => Some(ValueKind::Int),
            "float" | "f32" => Some(ValueKind::Float),
            "bool" => Some(ValueKind::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single typed value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i32),
    Float(f32),
    Bool(bool),
}

impl Value {
    /// Namespace this value belongs to
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// Infer a value from free text.
    ///
    /// Tried in order: integer, finite float, boolean (case-insensitive),
    /// and finally the text itself as a string.
    pub fn infer(text: &str) -> Value {
        if let Ok(i) = text.parse::<i32>() {
            return Value::Int(i);
        }
        if let Ok(f) = text.parse::<f32>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        if text.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        Value::Str(text.to_string())
    }

    /// Parse text as a value of the given kind
    pub fn parse_as(text: &str, kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::String => Some(Value::Str(text.to_string())),
            ValueKind::Int => text.parse().ok().map(Value::Int),
            ValueKind::Float => text
                .parse::<f32>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            ValueKind::Bool => {
                if text.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
        }
    }

    /// The type's zero value (`""`, `0`, `0.0`, `false`)
    pub fn zero(kind: ValueKind) -> Value {
        match kind {
            ValueKind::String => Value::Str(String::new()),
            ValueKind::Int => Value::Int(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Bool => Value::Bool(false),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that can be stored in a [`TypedRecord`].
///
/// Implemented for `String`, `i32`, `f32` and `bool`. The implementing type
/// selects the namespace, so `record.get::<i32>("x", 0)` and
/// `record.get::<String>("x", ..)` read independent entries.
pub trait PrefValue: sealed::Sealed + Clone + Sized {
    /// Namespace of this type
    const KIND: ValueKind;

    #[doc(hidden)]
    fn mapping(record: &TypedRecord) -> &BTreeMap<String, Self>;

    #[doc(hidden)]
    fn mapping_mut(record: &mut TypedRecord) -> &mut BTreeMap<String, Self>;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_pref_value {
    ($ty:ty, $kind:ident, $variant:ident, $field:ident) => {
        impl sealed::Sealed for $ty {}

        impl PrefValue for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn mapping(record: &TypedRecord) -> &BTreeMap<String, Self> {
                &record.$field
            }

            fn mapping_mut(record: &mut TypedRecord) -> &mut BTreeMap<String, Self> {
                &mut record.$field
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_pref_value!(String, String, Str, strings);
impl_pref_value!(i32, Int, Int, ints);
impl_pref_value!(f32, Float, Float, floats);
impl_pref_value!(bool, Bool, Bool, bools);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_order() {
        assert_eq!(Value::infer("42"), Value::Int(42));
        assert_eq!(Value::infer("-7"), Value::Int(-7));
        assert_eq!(Value::infer("1.5"), Value::Float(1.5));
        assert_eq!(Value::infer("True"), Value::Bool(true));
        assert_eq!(Value::infer("false"), Value::Bool(false));
        assert_eq!(Value::infer("hello"), Value::Str("hello".to_string()));
    }

    #[test]
    fn test_infer_rejects_non_finite_float() {
        assert_eq!(Value::infer("inf"), Value::Str("inf".to_string()));
        assert_eq!(Value::infer("NaN"), Value::Str("NaN".to_string()));
    }

    #[test]
    fn test_infer_int_overflow_becomes_float() {
        // Out of i32 range, still a finite f32
        assert_eq!(Value::infer("3000000000"), Value::Float(3.0e9));
    }

    #[test]
    fn test_parse_as() {
        assert_eq!(Value::parse_as("12", ValueKind::String), Some(Value::Str("12".into())));
        assert_eq!(Value::parse_as("12", ValueKind::Int), Some(Value::Int(12)));
        assert_eq!(Value::parse_as("12", ValueKind::Float), Some(Value::Float(12.0)));
        assert_eq!(Value::parse_as("yes", ValueKind::Bool), None);
        assert_eq!(Value::parse_as("1.5", ValueKind::Int), None);
    }

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ValueKind::parse("double"), None);
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::Str(String::new()).kind(), ValueKind::String);
        assert_eq!(Value::Int(1).kind(), ValueKind::Int);
        assert_eq!(Value::Float(1.0).kind(), ValueKind::Float);
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
    }

    #[test]
    fn test_from_value_checks_variant() {
        assert_eq!(i32::from_value(Value::Int(3)), Some(3));
        assert_eq!(i32::from_value(Value::Float(3.0)), None);
        assert_eq!(String::from_value(Value::Str("a".into())), Some("a".to_string()));
    }
}
