//! Decoding errors with enough context to diagnose a misbehaving producer

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Payload is not valid JSON
    #[error("Invalid JSON ({size} bytes): {reason}")]
    InvalidJson { reason: String, size: usize },

    /// Payload parsed but is not an object or array of objects
    #[error("Unexpected message shape: expected tick object or array, got {found}")]
    UnexpectedShape { found: &'static str },

    /// None of the candidate keys for a required field were present
    #[error("Missing {field}: none of {tried:?} present")]
    MissingField { field: &'static str, tried: Vec<String> },

    /// A field was present but its value is not usable
    #[error("Invalid {field} under '{key}': {raw}")]
    InvalidValue {
        field: &'static str,
        key: String,
        raw: String,
    },
}

impl DecodeError {
    pub fn invalid_json(err: &serde_json::Error, size: usize) -> Self {
        DecodeError::InvalidJson {
            reason: err.to_string(),
            size,
        }
    }

    pub fn invalid_value(field: &'static str, key: &str, raw: impl ToString) -> Self {
        DecodeError::InvalidValue {
            field,
            key: key.to_string(),
            raw: raw.to_string(),
        }
    }
}
