//! # In-memory Storage
//!
//! `MemoryStorage` keeps envelopes in a map for the lifetime of the
//! service. `NoopStorage` discards every write.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::errors::StorageResult;
use super::service::StorageService;
use crate::metadata::StorageKey;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<StorageKey, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StorageService for MemoryStorage {
    fn prepare(&self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self, key: &StorageKey) -> StorageResult<u64> {
        Ok(self
            .entries
            .read()
            .get(key)
            .map_or(0, |text| text.len() as u64))
    }

    fn write(&self, key: &StorageKey, text: &str) -> StorageResult<()> {
        self.entries.write().insert(key.clone(), text.to_string());
        Ok(())
    }

    fn read(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        Ok(self
            .entries
            .read()
            .get(key)
            .filter(|text| !text.trim().is_empty())
            .cloned())
    }

    fn delete(&self, key: &StorageKey) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Storage for ephemeral stores: nothing is ever persisted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStorage;

impl StorageService for NoopStorage {
    fn prepare(&self) -> StorageResult<()> {
        Ok(())
    }

    fn size(&self, _key: &StorageKey) -> StorageResult<u64> {
        Ok(0)
    }

    fn write(&self, _key: &StorageKey, _text: &str) -> StorageResult<()> {
        Ok(())
    }

    fn read(&self, _key: &StorageKey) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn delete(&self, _key: &StorageKey) -> StorageResult<()> {
        Ok(())
    }
}
