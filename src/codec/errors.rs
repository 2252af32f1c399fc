//! Codec error types
//!
//! Error codes:
//! - STASH_SERIALIZATION (ERROR) - a typed value could not be serialized
//! - STASH_DESERIALIZATION (ERROR) - a document could not be bound to the record type
//! - STASH_CONVERSION (ERROR) - a converter rejected a value

use thiserror::Error;

use crate::document::DocumentError;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("Converter '{converter}' failed on '{value}': {reason}")]
    Conversion {
        converter: &'static str,
        value: String,
        reason: String,
    },

    #[error("Expected {expected} payload, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl CodecError {
    pub fn conversion(converter: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::Conversion {
            converter,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Serialize(_) => "STASH_SERIALIZATION",
            CodecError::Deserialize(_) | CodecError::Shape { .. } | CodecError::Document(_) => {
                "STASH_DESERIALIZATION"
            }
            CodecError::Conversion { .. } => "STASH_CONVERSION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_display() {
        let err = CodecError::conversion("datetime", "yesterday", "no match for pattern");
        let display = err.to_string();
        assert!(display.contains("datetime"));
        assert!(display.contains("yesterday"));
        assert_eq!(err.code(), "STASH_CONVERSION");
    }
}
