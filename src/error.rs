//! Error handling for envfilter
//!
//! Errors only surface from non-real-time calls (prepare, parameter stores,
//! preset files). The audio callback itself never fails.

use thiserror::Error;

/// Result type alias for envfilter operations
pub type Result<T> = std::result::Result<T, EnvFilterError>;

/// Main error type for envfilter operations
#[derive(Error, Debug)]
pub enum EnvFilterError {
    // Parameter Errors
    #[error("Invalid parameter '{param}': {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    // Lifecycle Errors
    #[error("Invalid processing configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EnvFilterError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EnvFilterError::InvalidParameter { .. } => "INVALID_PARAMETER",
            EnvFilterError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            EnvFilterError::InvalidConfig { .. } => "INVALID_CONFIG",
            EnvFilterError::Io(_) => "IO_ERROR",
            EnvFilterError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Parameter errors can be fixed by the caller and retried; a bad
    /// processing configuration needs a different host setup.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EnvFilterError::InvalidParameter { .. }
                | EnvFilterError::UnknownParameter { .. }
                | EnvFilterError::Serialization(_)
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EnvFilterError::InvalidParameter { .. } => vec![
                "Use a value inside the documented parameter range",
                "Run 'envfilter-cli params' to list ranges and defaults",
            ],
            EnvFilterError::UnknownParameter { .. } => vec![
                "Check the parameter id spelling (ids are case sensitive)",
                "Run 'envfilter-cli params' to list valid ids",
            ],
            EnvFilterError::InvalidConfig { .. } => vec![
                "Sample rate must be finite and greater than zero",
                "Block size and channel count must be at least 1",
            ],
            EnvFilterError::Serialization(_) => vec![
                "The preset file may be corrupted - try re-saving it",
                "Missing fields fall back to their defaults, unknown fields are rejected",
            ],
            EnvFilterError::Io(_) => vec!["Check the file path and permissions"],
        }
    }
}
