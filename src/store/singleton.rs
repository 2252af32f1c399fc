//! Singleton store: at most one value
//!
//! An absent value is a legitimate state and persists as a `null` payload.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::builder::StoreBuilder;
use super::errors::StoreResult;
use super::lifecycle::{LoadOutcome, StoreState};
use super::options::{Mutation, StoreOptions};
use super::pipeline::{error_chain, Pipeline, StoreCore};
use crate::metadata::{StoreMetadata, StoreShape};
use crate::storage::StorageService;

struct Slot<T> {
    meta: StoreMetadata<T>,
    state: StoreState,
}

pub struct SingletonStore<T> {
    core: StoreCore,
    slot: Mutex<Slot<T>>,
}

impl<T> SingletonStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send,
{
    pub fn new(
        uid: impl Into<String>,
        payload_type_version: u32,
        storage: Arc<dyn StorageService>,
    ) -> StoreResult<Self> {
        StoreBuilder::new(uid, payload_type_version)
            .storage(storage)
            .singleton()
    }

    pub(crate) fn from_core(core: StoreCore) -> Self {
        let meta = StoreMetadata::new(core.uid.clone(), core.version, StoreShape::Singleton);
        Self {
            core,
            slot: Mutex::new(Slot {
                meta,
                state: StoreState::Transient,
            }),
        }
    }

    pub fn uid(&self) -> &str {
        &self.core.uid
    }

    pub fn options(&self) -> StoreOptions {
        self.core.options
    }

    pub fn state(&self) -> StoreState {
        self.slot.lock().state
    }

    pub fn metadata(&self) -> StoreMetadata<()> {
        self.slot.lock().meta.header()
    }

    pub fn size_on_disk(&self) -> StoreResult<u64> {
        self.core.size_on_disk()
    }

    /// Loads, migrates and binds the stored value.
    ///
    /// A stored `null` loads as "no value" and still counts as loaded.
    pub fn load(&self) -> StoreResult<LoadOutcome> {
        let mut slot = self.slot.lock();

        let loaded = match self
            .core
            .load_with(|codec, doc| codec.decode_singleton::<T>(doc))?
        {
            Pipeline::Empty => return Ok(LoadOutcome::Empty),
            Pipeline::Skipped(err) => return Ok(LoadOutcome::Skipped(err)),
            Pipeline::Loaded(loaded) => loaded,
        };

        slot.meta.replace_payload(loaded.payload);
        slot.meta.restore_timestamps(loaded.created, loaded.modified);
        slot.state = StoreState::Loaded;

        if loaded.migrated && self.core.options.auto_save {
            self.persist_logged(&mut slot);
        }

        Ok(LoadOutcome::Loaded {
            source_version: loaded.source_version,
            migrated: loaded.migrated,
        })
    }

    pub fn save(&self) -> StoreResult<()> {
        let mut slot = self.slot.lock();
        self.persist_locked(&mut slot)
    }

    /// Deletes the backing storage and discards the store.
    pub fn drop_store(self) -> StoreResult<()> {
        self.delete_storage()
    }

    pub(crate) fn delete_storage(&self) -> StoreResult<()> {
        let _slot = self.slot.lock();
        self.core.delete()
    }

    fn persist_locked(&self, slot: &mut Slot<T>) -> StoreResult<()> {
        self.core
            .write(&mut slot.meta, |codec, payload| codec.encode_singleton(payload))?;
        slot.state = StoreState::Persisted;
        Ok(())
    }

    fn persist_logged(&self, slot: &mut Slot<T>) {
        if let Err(err) = self.persist_locked(slot) {
            warn!(uid = %self.core.uid, code = err.code(), error = %error_chain(&err), "Auto-save failed");
        }
    }

    /// Replaces the value and returns the previous one.
    ///
    /// Passing `None` clears. Persists in auto-save mode even when the
    /// value is unchanged.
    pub fn set(&self, value: Option<T>) -> Option<T> {
        let mut slot = self.slot.lock();
        let previous = slot.meta.replace_payload(value);
        slot.state = StoreState::Mutated;
        if self.core.options.should_persist(Mutation::Reset, true) {
            self.persist_logged(&mut slot);
        }
        previous
    }

    pub fn replace(&self, value: T) -> Option<T> {
        self.set(Some(value))
    }

    /// Applies `f` to the current value under the store lock.
    ///
    /// `f` receives a copy, so the stored value survives if it panics.
    pub fn update(&self, f: impl FnOnce(Option<T>) -> Option<T>) {
        let mut slot = self.slot.lock();
        let next = f(slot.meta.payload().cloned());
        slot.meta.replace_payload(next);
        slot.state = StoreState::Mutated;
        if self.core.options.should_persist(Mutation::Reset, true) {
            self.persist_logged(&mut slot);
        }
    }

    pub fn clear(&self) -> Option<T> {
        self.set(None)
    }

    pub fn get(&self) -> Option<T> {
        self.slot.lock().meta.payload().cloned()
    }

    pub fn is_empty(&self) -> bool {
        !self.slot.lock().meta.has_payload()
    }
}

impl<T> std::fmt::Debug for SingletonStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonStore")
            .field("uid", &self.core.uid)
            .field("version", &self.core.version)
            .finish_non_exhaustive()
    }
}
