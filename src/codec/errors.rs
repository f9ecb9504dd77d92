//! Codec error types
//!
//! Error codes:
//! - PREFS_DECODE_TRUNCATED
//! - PREFS_DECODE_MALFORMED
//! - PREFS_DECODE_WRONG_SHAPE
//! - PREFS_ENCODE_NON_FINITE
//! - PREFS_ENCODE_FAILED

use thiserror::Error;

/// Persisted bytes could not be turned back into a record.
///
/// Decode is all-or-nothing: no partially populated record is ever returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input ended before the structure was complete
    #[error("snapshot truncated at line {line}, column {column}")]
    Truncated { line: usize, column: usize },

    /// Input is not well-formed structured text
    #[error("snapshot malformed at line {line}, column {column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },

    /// Well-formed text whose members have the wrong types
    #[error("snapshot has unexpected shape: {0}")]
    WrongShape(String),
}

impl DecodeError {
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::Truncated { .. } => "PREFS_DECODE_TRUNCATED",
            DecodeError::Malformed { .. } => "PREFS_DECODE_MALFORMED",
            DecodeError::WrongShape(_) => "PREFS_DECODE_WRONG_SHAPE",
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        let (line, column) = (e.line(), e.column());
        if e.is_eof() {
            DecodeError::Truncated { line, column }
        } else if e.is_data() {
            DecodeError::WrongShape(e.to_string())
        } else {
            DecodeError::Malformed {
                line,
                column,
                message: e.to_string(),
            }
        }
    }
}

/// A record could not be encoded
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Text encoding cannot represent NaN or infinity
    #[error("float value for key '{0}' is not finite")]
    NonFiniteFloat(String),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl EncodeError {
    pub fn code(&self) -> &'static str {
        match self {
            EncodeError::NonFiniteFloat(_) => "PREFS_ENCODE_NON_FINITE",
            EncodeError::Serialize(_) => "PREFS_ENCODE_FAILED",
        }
    }
}
