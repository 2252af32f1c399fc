//! Store error types
//!
//! Error codes:
//! - STASH_VERSION_INVERSION (FATAL) - stored version newer than code
//! - STASH_MIGRATION_FAILED (FATAL) - a handler rejected the stored payload
//! - STASH_CORRUPT_ENVELOPE (RECOVERABLE) - discriminator/version header invalid
//! - STASH_DESERIALIZATION (RECOVERABLE) - payload could not be bound
//! - STASH_SERIALIZATION (RECOVERABLE) - payload could not be encoded
//! - STASH_STORAGE_IO (RECOVERABLE) - backend read/write failed
//! - STASH_MISCONFIGURED (FATAL) - construction-time misconfiguration
//!
//! Only fatal errors escape `load()`; everything else is logged and the
//! load is treated as empty.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;
use crate::metadata::EnvelopeError;
use crate::migration::MigrationError;
use crate::storage::StorageError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged; the store keeps running
    Recoverable,
    /// Propagated to the caller; continuing risks data loss
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Recoverable => write!(f, "RECOVERABLE"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store '{uid}': stored payload version {stored} is newer than code version {current}")]
    VersionInversion { uid: String, stored: u32, current: u32 },

    #[error("Store '{uid}': migration from version {version} failed")]
    MigrationFailed {
        uid: String,
        version: u32,
        #[source]
        source: MigrationError,
    },

    #[error("Store '{uid}': corrupt envelope")]
    CorruptEnvelope {
        uid: String,
        #[source]
        source: EnvelopeError,
    },

    #[error("Store '{uid}': payload could not be bound")]
    Deserialization {
        uid: String,
        #[source]
        source: CodecError,
    },

    #[error("Store '{uid}': payload could not be encoded")]
    Serialization {
        uid: String,
        #[source]
        source: CodecError,
    },

    #[error("Store '{uid}': storage failure")]
    Storage {
        uid: String,
        #[source]
        source: StorageError,
    },

    #[error("Store misconfigured: {0}")]
    Misconfigured(String),
}

impl StoreError {
    /// Maps a migration engine error into the store taxonomy.
    pub(crate) fn from_migration(uid: &str, err: MigrationError) -> Self {
        match err {
            MigrationError::VersionInversion {
                uid,
                stored,
                current,
            } => StoreError::VersionInversion {
                uid,
                stored,
                current,
            },
            MigrationError::Failed { version, .. } => StoreError::MigrationFailed {
                uid: uid.to_string(),
                version,
                source: err,
            },
            MigrationError::PayloadShape { found, .. } => StoreError::Deserialization {
                uid: uid.to_string(),
                source: CodecError::Shape {
                    expected: "sequence",
                    found,
                },
            },
            MigrationError::DuplicateHandler(version) => StoreError::Misconfigured(format!(
                "duplicate migration handler for version {}",
                version
            )),
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::VersionInversion { .. } => "STASH_VERSION_INVERSION",
            StoreError::MigrationFailed { .. } => "STASH_MIGRATION_FAILED",
            StoreError::CorruptEnvelope { .. } => "STASH_CORRUPT_ENVELOPE",
            StoreError::Deserialization { .. } => "STASH_DESERIALIZATION",
            StoreError::Serialization { .. } => "STASH_SERIALIZATION",
            StoreError::Storage { .. } => "STASH_STORAGE_IO",
            StoreError::Misconfigured(_) => "STASH_MISCONFIGURED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StoreError::VersionInversion { .. }
            | StoreError::MigrationFailed { .. }
            | StoreError::Misconfigured(_) => Severity::Fatal,
            _ => Severity::Recoverable,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
