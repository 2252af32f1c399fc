//! Owned map of stores keyed by uid

use std::any;
use std::collections::BTreeMap;
use std::thread;

use tracing::{debug, error};

use super::errors::{RegistryError, RegistryResult};
use super::managed::ManagedStore;
use crate::store::{LoadOutcome, StoreResult};

/// Holds every store of an application under its uid.
///
/// Bulk operations run one scoped thread per store; stores never share
/// a lock, so they proceed in parallel.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: BTreeMap<String, Box<dyn ManagedStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a store; uids are unique within a registry.
    pub fn register<S: ManagedStore + 'static>(&mut self, store: S) -> RegistryResult<()> {
        let uid = store.uid().to_string();
        if self.stores.contains_key(&uid) {
            return Err(RegistryError::DuplicateUid(uid));
        }
        debug!(uid = %uid, shape = %store.shape(), "Store registered");
        self.stores.insert(uid, Box::new(store));
        Ok(())
    }

    /// Typed access to a registered store.
    pub fn get<S: ManagedStore + 'static>(&self, uid: &str) -> RegistryResult<&S> {
        let store = self
            .stores
            .get(uid)
            .ok_or_else(|| RegistryError::NotFound(uid.to_string()))?;
        store
            .as_any()
            .downcast_ref::<S>()
            .ok_or_else(|| RegistryError::TypeMismatch {
                uid: uid.to_string(),
                expected: any::type_name::<S>(),
            })
    }

    pub fn get_dyn(&self, uid: &str) -> Option<&dyn ManagedStore> {
        self.stores.get(uid).map(|store| &**store)
    }

    pub fn remove(&mut self, uid: &str) -> Option<Box<dyn ManagedStore>> {
        self.stores.remove(uid)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.stores.contains_key(uid)
    }

    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn load_all(&self) -> BTreeMap<String, RegistryResult<LoadOutcome>> {
        self.each(|store| store.load())
    }

    pub fn save_all(&self) -> BTreeMap<String, RegistryResult<()>> {
        self.each(|store| store.save())
    }

    /// Deletes the backing storage of every store and empties the registry.
    pub fn drop_all(&mut self) -> BTreeMap<String, RegistryResult<()>> {
        let results = self.each(|store| store.delete_storage());
        self.stores.clear();
        results
    }

    fn each<R, F>(&self, op: F) -> BTreeMap<String, RegistryResult<R>>
    where
        R: Send,
        F: Fn(&dyn ManagedStore) -> StoreResult<R> + Sync,
    {
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .stores
                .iter()
                .map(|(uid, store)| {
                    let op = &op;
                    (uid, scope.spawn(move || op(&**store)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(uid, handle)| {
                    let result = match handle.join() {
                        Ok(result) => result.map_err(RegistryError::from),
                        Err(panic) => {
                            let message = panic
                                .downcast_ref::<&str>()
                                .map(|s| s.to_string())
                                .or_else(|| panic.downcast_ref::<String>().cloned())
                                .unwrap_or_else(|| "(non-string panic)".to_string());
                            error!(uid = %uid, message = %message, "Store operation panicked");
                            Err(RegistryError::Panicked {
                                uid: uid.clone(),
                                message,
                            })
                        }
                    };
                    (uid.clone(), result)
                })
                .collect()
        })
    }
}
