//! Document error types

use thiserror::Error;

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors raised while inspecting or rewriting a generic document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Text could not be parsed as JSON
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field operation was attempted on a non-mapping node
    #[error("Expected mapping, found {found}")]
    NotAMapping { found: &'static str },

    /// A required field is absent
    #[error("Missing field '{0}'")]
    MissingField(String),

    /// A field holds the wrong shape
    #[error("Field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Rename target already exists
    #[error("Field '{0}' already exists")]
    FieldExists(String),

    /// Path expression could not be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl DocumentError {
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        DocumentError::TypeMismatch {
            field: field.into(),
            expected,
            found,
        }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DocumentError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
