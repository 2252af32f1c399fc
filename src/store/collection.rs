//! Collection store: a set-valued payload
//!
//! Set semantics follow the element type's `Eq + Hash`. Every operation
//! takes the store lock, so snapshots never observe a torn payload and a
//! mutation and its persist are one critical section.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
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
    meta: StoreMetadata<HashSet<T>>,
    state: StoreState,
}

pub struct CollectionStore<T> {
    core: StoreCore,
    slot: Mutex<Slot<T>>,
}

impl<T> CollectionStore<T>
where
    T: Serialize + DeserializeOwned + Eq + Hash + Clone + Send,
{
    /// Creates a store with default codec, no migrations and auto-save on.
    pub fn new(
        uid: impl Into<String>,
        payload_type_version: u32,
        storage: Arc<dyn StorageService>,
    ) -> StoreResult<Self> {
        StoreBuilder::new(uid, payload_type_version)
            .storage(storage)
            .collection()
    }

    pub(crate) fn from_core(core: StoreCore) -> Self {
        let meta = StoreMetadata::new(core.uid.clone(), core.version, StoreShape::Collection);
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

    /// Metadata header without the payload.
    pub fn metadata(&self) -> StoreMetadata<()> {
        self.slot.lock().meta.header()
    }

    pub fn size_on_disk(&self) -> StoreResult<u64> {
        self.core.size_on_disk()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Loads, migrates and binds the stored payload.
    ///
    /// # Errors
    ///
    /// Only `VersionInversion` and `MigrationFailed`. Every other failure
    /// is logged and reported as `LoadOutcome::Skipped`, leaving the
    /// in-memory payload untouched.
    pub fn load(&self) -> StoreResult<LoadOutcome> {
        let mut slot = self.slot.lock();

        let loaded = match self
            .core
            .load_with(|codec, doc| codec.decode_collection::<T>(doc))?
        {
            Pipeline::Empty => return Ok(LoadOutcome::Empty),
            Pipeline::Skipped(err) => return Ok(LoadOutcome::Skipped(err)),
            Pipeline::Loaded(loaded) => loaded,
        };

        slot.meta.set_payload(loaded.payload.into_iter().collect());
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

    /// Persists the current payload.
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
        self.core.write(&mut slot.meta, |codec, payload| {
            codec.encode_collection(payload.into_iter().flatten())
        })?;
        slot.state = StoreState::Persisted;
        Ok(())
    }

    /// Auto-save path: failures leave memory intact and are only logged.
    fn persist_logged(&self, slot: &mut Slot<T>) {
        if let Err(err) = self.persist_locked(slot) {
            warn!(uid = %self.core.uid, code = err.code(), error = %error_chain(&err), "Auto-save failed");
        }
    }

    /// Applies a mutation under the lock, then runs the auto-save policy.
    fn mutate<R>(
        &self,
        mutation: Mutation,
        f: impl FnOnce(&mut HashSet<T>) -> (bool, R),
    ) -> R {
        let mut slot = self.slot.lock();
        let (changed, result) = f(slot.meta.payload_or_insert_with(HashSet::new));
        if changed {
            slot.state = StoreState::Mutated;
        }
        if self.core.options.should_persist(mutation, changed) {
            self.persist_logged(&mut slot);
        }
        result
    }

    fn read<R>(&self, f: impl FnOnce(Option<&HashSet<T>>) -> R) -> R {
        let slot = self.slot.lock();
        f(slot.meta.payload())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Adds a value; returns true if it was not present.
    pub fn add(&self, value: T) -> bool {
        self.mutate(Mutation::Insert, |set| {
            let changed = set.insert(value);
            (changed, changed)
        })
    }

    pub fn add_all(&self, values: impl IntoIterator<Item = T>) -> bool {
        self.mutate(Mutation::Insert, |set| {
            let mut changed = false;
            for value in values {
                changed |= set.insert(value);
            }
            (changed, changed)
        })
    }

    /// Removes a value; returns true if it was present.
    pub fn remove(&self, value: &T) -> bool {
        self.mutate(Mutation::Remove, |set| {
            let changed = set.remove(value);
            (changed, changed)
        })
    }

    pub fn remove_all<I>(&self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        self.mutate(Mutation::Remove, |set| {
            let mut changed = false;
            for value in values {
                changed |= set.remove(value.borrow());
            }
            (changed, changed)
        })
    }

    /// Removes every value matching `predicate`.
    pub fn remove_if(&self, mut predicate: impl FnMut(&T) -> bool) -> bool {
        self.mutate(Mutation::Remove, |set| {
            let before = set.len();
            set.retain(|value| !predicate(value));
            let changed = set.len() != before;
            (changed, changed)
        })
    }

    /// Keeps only values also contained in `values`.
    pub fn retain_all<I>(&self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let keep: HashSet<T> = values.into_iter().map(|v| v.borrow().clone()).collect();
        self.mutate(Mutation::Insert, |set| {
            let before = set.len();
            set.retain(|value| keep.contains(value));
            let changed = set.len() != before;
            (changed, changed)
        })
    }

    /// Removes everything; always persists in auto-save mode.
    pub fn clear(&self) {
        self.mutate(Mutation::Reset, |set| {
            let changed = !set.is_empty();
            set.clear();
            (changed, ())
        })
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn contains(&self, value: &T) -> bool {
        self.read(|set| set.is_some_and(|s| s.contains(value)))
    }

    pub fn contains_all<I>(&self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        self.read(|set| {
            let mut values = values.into_iter().peekable();
            match set {
                Some(s) => values.all(|v| s.contains(v.borrow())),
                None => values.peek().is_none(),
            }
        })
    }

    pub fn size(&self) -> usize {
        self.read(|set| set.map_or(0, HashSet::len))
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Independent copy of the current set.
    pub fn snapshot(&self) -> HashSet<T> {
        self.read(|set| set.cloned().unwrap_or_default())
    }

    /// Runs `action` over a snapshot, outside the store lock.
    pub fn for_each(&self, action: impl FnMut(&T)) {
        self.snapshot().iter().for_each(action);
    }
}

impl<T> std::fmt::Debug for CollectionStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("uid", &self.core.uid)
            .field("version", &self.core.version)
            .finish_non_exhaustive()
    }
}
