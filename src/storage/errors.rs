//! Storage error types
//!
//! Error codes:
//! - STASH_STORAGE_IO (ERROR) - backing location could not be read or written

use std::io;

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at '{location}': {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("Content at '{location}' is not valid UTF-8")]
    Encoding { location: String },
}

impl StorageError {
    pub fn io(location: impl Into<String>, source: io::Error) -> Self {
        StorageError::Io {
            location: location.into(),
            source,
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        "STASH_STORAGE_IO"
    }

    pub fn location(&self) -> &str {
        match self {
            StorageError::Io { location, .. } | StorageError::Encoding { location } => location,
        }
    }
}
