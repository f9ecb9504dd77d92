//! Structured-text encoding of a typed record
//!
//! Layout:
//!
//! ```text
//! {"strings":{..},"ints":{..},"floats":{..},"bools":{..}}
//! ```
//!
//! Missing members decode as empty mappings and unknown members are
//! ignored. A member with the wrong JSON type fails the whole decode.

use crate::record::TypedRecord;

use super::errors::{DecodeError, EncodeError};

/// Output layout; purely cosmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formatting {
    /// Single line, no whitespace
    #[default]
    Compact,
    /// Indented, human-readable
    Pretty,
}

impl Formatting {
    pub fn from_pretty(pretty: bool) -> Self {
        if pretty {
            Formatting::Pretty
        } else {
            Formatting::Compact
        }
    }
}

/// Serialize a record
pub fn encode(record: &TypedRecord, formatting: Formatting) -> Result<Vec<u8>, EncodeError> {
    if let Some((key, _)) = record.floats.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EncodeError::NonFiniteFloat(key.clone()));
    }

    let bytes = match formatting {
        Formatting::Compact => serde_json::to_vec(record)?,
        Formatting::Pretty => serde_json::to_vec_pretty(record)?,
    };
    Ok(bytes)
}

/// Parse bytes produced by [`encode`].
///
/// Out-of-range floats parse as infinity; they are rejected here so a
/// record that cannot be re-encoded is never returned.
pub fn decode(bytes: &[u8]) -> Result<TypedRecord, DecodeError> {
    let record: TypedRecord = serde_json::from_slice(bytes)?;
    if let Some((key, value)) = record.floats.iter().find(|(_, v)| !v.is_finite()) {
        return Err(DecodeError::WrongShape(format!(
            "float value {} for key '{}' is not finite",
            value, key
        )));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TypedRecord {
        let mut record = TypedRecord::new();
        record.set("player", "ada \"the\" great\n".to_string());
        record.set("level", 3i32);
        record.set("min", i32::MIN);
        record.set("volume", 0.1f32);
        record.set("offset", -2.5f32);
        record.set("muted", true);
        record.set("level", "three".to_string());
        record
    }

    #[test]
    fn test_round_trip_compact_and_pretty() {
        let record = sample();
        for formatting in [Formatting::Compact, Formatting::Pretty] {
            let bytes = encode(&record, formatting).unwrap();
            assert_eq!(decode(&bytes).unwrap(), record);
        }
    }

    #[test]
    fn test_empty_record_round_trip() {
        let bytes = encode(&TypedRecord::new(), Formatting::Compact).unwrap();
        assert_eq!(
            bytes,
            br#"{"strings":{},"ints":{},"floats":{},"bools":{}}"#.to_vec()
        );
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_pretty_is_multiline_compact_is_not() {
        let record = sample();
        let compact = encode(&record, Formatting::Compact).unwrap();
        let pretty = encode(&record, Formatting::Pretty).unwrap();

        assert!(!compact.contains(&b'\n'));
        assert!(pretty.contains(&b'\n'));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut a = TypedRecord::new();
        a.set("b", 2i32);
        a.set("a", 1i32);

        let mut b = TypedRecord::new();
        b.set("a", 1i32);
        b.set("b", 2i32);

        assert_eq!(
            encode(&a, Formatting::Compact).unwrap(),
            encode(&b, Formatting::Compact).unwrap()
        );
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let mut record = TypedRecord::new();
        record.set("speed", f32::NAN);

        let err = encode(&record, Formatting::Compact).unwrap_err();
        assert!(matches!(err, EncodeError::NonFiniteFloat(ref k) if k == "speed"));
    }

    #[test]
    fn test_missing_members_default_to_empty() {
        let record = decode(br#"{"ints":{"level":7}}"#).unwrap();
        assert_eq!(record.get("level", 0i32), 7);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_unknown_members_ignored() {
        let record = decode(br#"{"version":2,"bools":{"on":true}}"#).unwrap();
        assert!(record.get("on", false));
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(decode(b""), Err(DecodeError::Truncated { .. })));
        assert!(matches!(
            decode(br#"{"ints":{"a":1"#),
            Err(DecodeError::Truncated { .. })
        ));
        assert!(matches!(decode(b"not json"), Err(DecodeError::Malformed { .. })));
        assert!(matches!(decode(b"[1,2,3]"), Err(DecodeError::WrongShape(_))));
        assert!(matches!(
            decode(br#"{"ints":{"a":"one"}}"#),
            Err(DecodeError::WrongShape(_))
        ));
        assert!(matches!(
            decode(br#"{"ints":{"a":4294967296}}"#),
            Err(DecodeError::WrongShape(_))
        ));
    }

    #[test]
    fn test_decode_rejects_out_of_range_float() {
        let err = decode(br#"{"floats":{"big":1e39}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::WrongShape(_)));
        assert!(err.to_string().contains("big"));

        // Largest finite f32 still loads
        let record = decode(br#"{"floats":{"max":3.4028235e38}}"#).unwrap();
        assert_eq!(record.get("max", 0.0f32), f32::MAX);
    }

    #[test]
    fn test_decode_invalid_utf8_fails() {
        assert!(decode(&[0xFF, 0xFE, 0x7B]).is_err());
    }
}
