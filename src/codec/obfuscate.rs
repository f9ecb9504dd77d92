//! Reversible byte obfuscation
//!
//! XOR against a repeating key. This is NOT encryption: anyone holding the
//! file and a few bytes of known plaintext can recover the key. It only
//! keeps the raw file from being trivially human-readable.

/// XOR `bytes` with `key`, repeating the key as needed.
///
/// An empty key leaves the input unchanged.
pub fn obfuscate(bytes: &[u8], key: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    xor_in_place(&mut out, key);
    out
}

/// Inverse of [`obfuscate`]; XOR is its own inverse
pub fn deobfuscate(bytes: &[u8], key: &[u8]) -> Vec<u8> {
    obfuscate(bytes, key)
}

/// XOR a buffer in place
pub fn xor_in_place(bytes: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }
    for (b, k) in bytes.iter_mut().zip(key.iter().cycle()) {
        *b ^= k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = br#"{"ints":{"level":3}}"#;
        for key in [&b"k"[..], b"secret", b"a much longer key than the data itself!!"] {
            let scrambled = obfuscate(data, key);
            assert_eq!(deobfuscate(&scrambled, key), data.to_vec());
        }
    }

    #[test]
    fn test_changes_bytes() {
        let data = b"plain text preferences";
        let scrambled = obfuscate(data, b"key");
        assert_ne!(scrambled, data.to_vec());
        assert_eq!(scrambled.len(), data.len());
    }

    #[test]
    fn test_key_repeats() {
        let scrambled = obfuscate(&[0, 0, 0, 0, 0], b"ab");
        assert_eq!(scrambled, vec![b'a', b'b', b'a', b'b', b'a']);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(obfuscate(b"", b"key").is_empty());
        assert_eq!(obfuscate(b"data", b""), b"data".to_vec());
    }

    #[test]
    fn test_all_byte_values_round_trip() {
        let data: Vec<u8> = (0..=255u8).collect();
        let key = [0xFFu8, 0x00, 0x5A];
        assert_eq!(deobfuscate(&obfuscate(&data, &key), &key), data);
    }
}
