//! Codec between typed records and persisted bytes
//!
//! Layering, outermost last:
//!
//! ```text
//! write: record -> encode -> obfuscate -> bytes on disk
//! read:  bytes on disk -> deobfuscate -> decode -> record
//! ```

mod errors;
mod json;
mod obfuscate;

pub use errors::{DecodeError, EncodeError};
pub use json::{decode, encode, Formatting};
pub use obfuscate::{deobfuscate, obfuscate, xor_in_place};

use crate::record::TypedRecord;

/// Formatting plus optional obfuscation, applied in a fixed order
#[derive(Debug, Clone, Default)]
pub struct Codec {
    formatting: Formatting,
    obfuscation_key: Option<Vec<u8>>,
}

impl Codec {
    pub fn new(formatting: Formatting) -> Self {
        Self {
            formatting,
            obfuscation_key: None,
        }
    }

    /// Enable obfuscation with `key`. An empty key disables it.
    pub fn with_obfuscation(mut self, key: impl AsRef<[u8]>) -> Self {
        let key = key.as_ref();
        self.obfuscation_key = if key.is_empty() {
            None
        } else {
            Some(key.to_vec())
        };
        self
    }

    pub fn formatting(&self) -> Formatting {
        self.formatting
    }

    pub fn is_obfuscated(&self) -> bool {
        self.obfuscation_key.is_some()
    }

    /// Encode a record into its on-disk form
    pub fn to_disk(&self, record: &TypedRecord) -> Result<Vec<u8>, EncodeError> {
        let encoded = encode(record, self.formatting)?;
        Ok(self.seal(encoded))
    }

    /// Decode on-disk bytes into a record
    pub fn from_disk(&self, bytes: &[u8]) -> Result<TypedRecord, DecodeError> {
        decode(&self.unseal(bytes.to_vec()))
    }

    /// Apply the outer transform to already-encoded bytes
    pub fn seal(&self, mut bytes: Vec<u8>) -> Vec<u8> {
        if let Some(key) = &self.obfuscation_key {
            xor_in_place(&mut bytes, key);
        }
        bytes
    }

    /// Reverse the outer transform, yielding encoded bytes
    pub fn unseal(&self, bytes: Vec<u8>) -> Vec<u8> {
        // XOR is symmetric
        self.seal(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TypedRecord {
        let mut record = TypedRecord::new();
        record.set("name", "ada".to_string());
        record.set("level", 3i32);
        record.set("volume", 0.8f32);
        record.set("muted", false);
        record
    }

    #[test]
    fn test_plain_disk_bytes_are_encoding() {
        let codec = Codec::new(Formatting::Compact);
        let record = sample();

        let disk = codec.to_disk(&record).unwrap();
        assert_eq!(disk, encode(&record, Formatting::Compact).unwrap());
        assert_eq!(codec.from_disk(&disk).unwrap(), record);
    }

    #[test]
    fn test_obfuscated_round_trip() {
        let codec = Codec::new(Formatting::Pretty).with_obfuscation("hunter2");
        let record = sample();

        let disk = codec.to_disk(&record).unwrap();
        let encoded = encode(&record, Formatting::Pretty).unwrap();
        assert_ne!(disk, encoded);
        assert_eq!(disk, obfuscate(&encoded, b"hunter2"));
        assert_eq!(codec.from_disk(&disk).unwrap(), record);
    }

    #[test]
    fn test_wrong_key_fails_decode() {
        let writer = Codec::new(Formatting::Compact).with_obfuscation("right");
        let reader = Codec::new(Formatting::Compact).with_obfuscation("wrong");

        let disk = writer.to_disk(&sample()).unwrap();
        assert!(reader.from_disk(&disk).is_err());
    }

    #[test]
    fn test_empty_key_disables_obfuscation() {
        let codec = Codec::new(Formatting::Compact).with_obfuscation("");
        assert!(!codec.is_obfuscated());
    }

    #[test]
    fn test_formatting_has_no_semantic_effect() {
        let record = sample();
        let compact = Codec::new(Formatting::Compact);
        let pretty = Codec::new(Formatting::Pretty);

        let from_pretty = compact.from_disk(&pretty.to_disk(&record).unwrap()).unwrap();
        assert_eq!(from_pretty, record);
    }
}
