//! Registry error types
//!
//! Error codes:
//! - STASH_REGISTRY_DUPLICATE_UID - a store with this uid is already registered
//! - STASH_REGISTRY_NOT_FOUND - no store registered under the uid
//! - STASH_REGISTRY_TYPE_MISMATCH - the store exists with a different type
//! - STASH_REGISTRY_PANICKED - a store operation panicked on its worker thread
//! - the store's own code for wrapped store errors

use thiserror::Error;

use crate::store::StoreError;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Store '{0}' is already registered")]
    DuplicateUid(String),

    #[error("No store registered as '{0}'")]
    NotFound(String),

    #[error("Store '{uid}' is not a {expected}")]
    TypeMismatch { uid: String, expected: &'static str },

    #[error("Store '{uid}' panicked: {message}")]
    Panicked { uid: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateUid(_) => "STASH_REGISTRY_DUPLICATE_UID",
            RegistryError::NotFound(_) => "STASH_REGISTRY_NOT_FOUND",
            RegistryError::TypeMismatch { .. } => "STASH_REGISTRY_TYPE_MISMATCH",
            RegistryError::Panicked { .. } => "STASH_REGISTRY_PANICKED",
            RegistryError::Store(err) => err.code(),
        }
    }

    /// The wrapped store error, if any.
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            RegistryError::Store(err) => Some(err),
            _ => None,
        }
    }
}
