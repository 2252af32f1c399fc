//! stashdb - versioned, migratable JSON stores
//!
//! Each store binds one typed payload, a set of values or a single value,
//! to one JSON file. Stored payloads carry a schema version and are
//! migrated forward through registered handlers before typed binding.

pub mod cli;
pub mod codec;
pub mod config;
pub mod document;
pub mod metadata;
pub mod migration;
pub mod registry;
pub mod storage;
pub mod store;

pub use codec::{Converter, ConverterRegistry, ConverterScope, ConverterSet, TypeCodec};
pub use config::StashConfig;
pub use document::{Document, DocumentMap, DocumentPath};
pub use metadata::{StoreMetadata, StoreShape};
pub use migration::{MigrationStepError, MigrationTable};
pub use registry::{ManagedStore, StoreRegistry};
pub use storage::{FileStorage, MemoryStorage, StorageService};
pub use store::{
    CollectionStore, LoadOutcome, SingletonStore, StoreBuilder, StoreError, StoreOptions,
    StoreResult, StoreState,
};
