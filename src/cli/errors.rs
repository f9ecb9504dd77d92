//! CLI-specific error types
//!
//! Every CLI error ends the invocation with a non-zero exit status.

use std::fmt;
use std::io;

use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration missing or rejected
    ConfigError,
    /// Argument could not be interpreted
    InvalidArgument,
    /// I/O error (files, stdout)
    IoError,
    /// Store operation failed; carries the store's code
    Store(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PREFS_CLI_CONFIG_ERROR",
            Self::InvalidArgument => "PREFS_CLI_INVALID_ARGUMENT",
            Self::IoError => "PREFS_CLI_IO_ERROR",
            Self::Store(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidConfiguration(msg) => Self::config_error(msg),
            other => Self::new(CliErrorCode::Store(other.code()), other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_keeps_code() {
        let err: CliError = StoreError::InvalidKey("key must not be empty".into()).into();
        assert_eq!(err.code_str(), "PREFS_INVALID_KEY");
        assert_eq!(err.message(), "invalid key: key must not be empty");
    }

    #[test]
    fn test_invalid_configuration_maps_to_config_error() {
        let err: CliError = StoreError::InvalidConfiguration("bad".into()).into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert_eq!(err.to_string(), "PREFS_CLI_CONFIG_ERROR: bad");
    }
}
