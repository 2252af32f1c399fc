//! # Storage Service Trait

use super::errors::StorageResult;
use crate::metadata::StorageKey;

/// Physical persistence for store envelopes.
///
/// Stores never touch the file system directly; they hand the rendered
/// envelope text to a service keyed by the store's identity.
pub trait StorageService: Send + Sync + std::fmt::Debug {
    /// Prepare the backend (create directories etc.)
    fn prepare(&self) -> StorageResult<()>;

    /// Size in bytes of the persisted envelope, 0 if absent
    fn size(&self, key: &StorageKey) -> StorageResult<u64>;

    /// Replace the persisted envelope
    fn write(&self, key: &StorageKey, text: &str) -> StorageResult<()>;

    /// Read the persisted envelope; absent or empty content is `None`
    fn read(&self, key: &StorageKey) -> StorageResult<Option<String>>;

    /// Delete the persisted envelope; deleting absent content succeeds
    fn delete(&self, key: &StorageKey) -> StorageResult<()>;
}
