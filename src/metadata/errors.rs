//! Envelope error types
//!
//! Every variant means the persisted unit cannot be trusted as a stashdb
//! envelope. Loaders treat all of them as a corrupt envelope.

use thiserror::Error;

use crate::document::DocumentError;

/// Result type for envelope decoding
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Envelope is not valid JSON: {0}")]
    Parse(#[from] DocumentError),

    #[error("Envelope must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Envelope has no 'class' discriminator")]
    MissingClass,

    #[error("Envelope class '{found}' does not match '{expected}'")]
    ClassMismatch { expected: &'static str, found: String },

    #[error("Envelope has no 'payloadTypeVersion'")]
    MissingVersion,

    #[error("Envelope 'payloadTypeVersion' is not a non-negative integer: {found}")]
    InvalidVersion { found: String },

    #[error("Envelope shape mismatch: store is {expected}, file is {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Envelope field '{field}' is not a valid timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}
