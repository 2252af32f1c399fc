//! Type-erased view of a store

use std::any::Any;
use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::metadata::StoreShape;
use crate::store::{CollectionStore, LoadOutcome, SingletonStore, StoreResult, StoreState};

/// Lifecycle operations shared by every store, independent of payload type.
pub trait ManagedStore: Send + Sync + fmt::Debug {
    fn uid(&self) -> &str;

    fn shape(&self) -> StoreShape;

    fn state(&self) -> StoreState;

    fn load(&self) -> StoreResult<LoadOutcome>;

    fn save(&self) -> StoreResult<()>;

    /// Deletes the backing storage; the store stays usable in memory.
    fn delete_storage(&self) -> StoreResult<()>;

    fn as_any(&self) -> &dyn Any;
}

impl<T> ManagedStore for CollectionStore<T>
where
    T: Serialize + DeserializeOwned + Eq + Hash + Clone + Send + 'static,
{
    fn uid(&self) -> &str {
        CollectionStore::uid(self)
    }

    fn shape(&self) -> StoreShape {
        StoreShape::Collection
    }

    fn state(&self) -> StoreState {
        CollectionStore::state(self)
    }

    fn load(&self) -> StoreResult<LoadOutcome> {
        CollectionStore::load(self)
    }

    fn save(&self) -> StoreResult<()> {
        CollectionStore::save(self)
    }

    fn delete_storage(&self) -> StoreResult<()> {
        CollectionStore::delete_storage(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T> ManagedStore for SingletonStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    fn uid(&self) -> &str {
        SingletonStore::uid(self)
    }

    fn shape(&self) -> StoreShape {
        StoreShape::Singleton
    }

    fn state(&self) -> StoreState {
        SingletonStore::state(self)
    }

    fn load(&self) -> StoreResult<LoadOutcome> {
        SingletonStore::load(self)
    }

    fn save(&self) -> StoreResult<()> {
        SingletonStore::save(self)
    }

    fn delete_storage(&self) -> StoreResult<()> {
        SingletonStore::delete_storage(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
