//! Migration error types
//!
//! Error codes:
//! - STASH_VERSION_INVERSION (FATAL) - stored version newer than code
//! - STASH_MIGRATION_FAILED (FATAL) - a handler rejected the document
//! - STASH_MIGRATION_PAYLOAD_SHAPE (ERROR) - collection payload is not a sequence

use thiserror::Error;

use crate::document::DocumentError;

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Error returned by a single migration handler.
#[derive(Debug, Error)]
pub enum MigrationStepError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Invalid(String),
}

impl MigrationStepError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MigrationStepError::Invalid(message.into())
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    /// Persisted schema is newer than the running code
    #[error("Store '{uid}': stored payload version {stored} is newer than code version {current}")]
    VersionInversion { uid: String, stored: u32, current: u32 },

    /// A handler failed; the load must not proceed
    #[error("Store '{uid}': migration from version {version} failed{}: {source}", element_suffix(.element))]
    Failed {
        uid: String,
        version: u32,
        element: Option<usize>,
        #[source]
        source: MigrationStepError,
    },

    /// Collection payload is something other than a sequence
    #[error("Store '{uid}': collection payload must be a sequence, found {found}")]
    PayloadShape { uid: String, found: &'static str },

    /// Two handlers registered for the same source version
    #[error("Migration handler for version {0} is already registered")]
    DuplicateHandler(u32),
}

fn element_suffix(element: &Option<usize>) -> String {
    match element {
        Some(idx) => format!(" at element {}", idx),
        None => String::new(),
    }
}

impl MigrationError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            MigrationError::VersionInversion { .. } => "STASH_VERSION_INVERSION",
            MigrationError::Failed { .. } => "STASH_MIGRATION_FAILED",
            MigrationError::PayloadShape { .. } => "STASH_MIGRATION_PAYLOAD_SHAPE",
            MigrationError::DuplicateHandler(_) => "STASH_DUPLICATE_HANDLER",
        }
    }

    /// Whether continuing would risk silent data loss on the next save
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MigrationError::VersionInversion { .. } | MigrationError::Failed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display_includes_context() {
        let err = MigrationError::Failed {
            uid: "users".into(),
            version: 3,
            element: Some(7),
            source: MigrationStepError::invalid("bad id"),
        };
        let display = err.to_string();
        assert!(display.contains("users"));
        assert!(display.contains("version 3"));
        assert!(display.contains("element 7"));
        assert!(display.contains("bad id"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_payload_shape_not_fatal() {
        let err = MigrationError::PayloadShape {
            uid: "u".into(),
            found: "mapping",
        };
        assert!(!err.is_fatal());
        assert_eq!(err.code(), "STASH_MIGRATION_PAYLOAD_SHAPE");
    }
}
