//! Store construction

use std::hash::Hash;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::collection::CollectionStore;
use super::errors::{StoreError, StoreResult};
use super::options::StoreOptions;
use super::pipeline::StoreCore;
use super::singleton::SingletonStore;
use crate::codec::{ConverterRegistry, TypeCodec};
use crate::metadata::StoreShape;
use crate::migration::MigrationTable;
use crate::storage::StorageService;

/// Collects the collaborators of a store before building it.
///
/// A storage service is required; codec, migrations and options default.
#[derive(Debug)]
pub struct StoreBuilder {
    uid: String,
    version: u32,
    storage: Option<Arc<dyn StorageService>>,
    codec: Option<TypeCodec>,
    migrations: MigrationTable,
    options: StoreOptions,
}

impl StoreBuilder {
    pub fn new(uid: impl Into<String>, payload_type_version: u32) -> Self {
        Self {
            uid: uid.into(),
            version: payload_type_version,
            storage: None,
            codec: None,
            migrations: MigrationTable::new(),
            options: StoreOptions::default(),
        }
    }

    pub fn storage(mut self, storage: Arc<dyn StorageService>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn codec(mut self, codec: TypeCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Uses the converters the registry holds for this store's uid.
    pub fn converters(self, registry: &ConverterRegistry) -> Self {
        let codec = TypeCodec::new(registry.for_uid(&self.uid));
        self.codec(codec)
    }

    pub fn migrations(mut self, migrations: MigrationTable) -> Self {
        self.migrations = migrations;
        self
    }

    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn collection<T>(self) -> StoreResult<CollectionStore<T>>
    where
        T: Serialize + DeserializeOwned + Eq + Hash + Clone + Send,
    {
        Ok(CollectionStore::from_core(self.into_core(StoreShape::Collection)?))
    }

    pub fn singleton<T>(self) -> StoreResult<SingletonStore<T>>
    where
        T: Serialize + DeserializeOwned + Clone + Send,
    {
        Ok(SingletonStore::from_core(self.into_core(StoreShape::Singleton)?))
    }

    fn into_core(self, shape: StoreShape) -> StoreResult<StoreCore> {
        validate_uid(&self.uid)?;
        let storage = self.storage.ok_or_else(|| {
            StoreError::Misconfigured(format!("store '{}' has no storage service", self.uid))
        })?;

        if let Some(highest) = self.migrations.versions().last() {
            if highest >= self.version {
                warn!(
                    uid = %self.uid,
                    handler = highest,
                    version = self.version,
                    "Migration handler at or above the current version is never applied"
                );
            }
        }

        Ok(StoreCore {
            uid: self.uid,
            version: self.version,
            shape,
            storage,
            codec: self.codec.unwrap_or_default(),
            migrations: self.migrations,
            options: self.options,
        })
    }
}

/// A uid becomes part of a file name, so it must be a plain name.
fn validate_uid(uid: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::Misconfigured(format!("invalid uid '{}': {}", uid, reason));

    if uid.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if uid.contains(['/', '\\']) || uid == "." || uid == ".." {
        return Err(invalid("must not contain path separators"));
    }
    if uid.starts_with("singleton.") {
        return Err(invalid("must not start with 'singleton.'"));
    }
    if uid.chars().any(char::is_control) {
        return Err(invalid("must not contain control characters"));
    }
    Ok(())
}
