//! Persistent Stores for stashdb
//!
//! A store binds one typed payload to one backing location. Two shapes
//! exist: `CollectionStore<T>` holds a set of values and `SingletonStore<T>`
//! holds at most one.
//!
//! # Design Principles
//!
//! - One lock per store; every mutation and its persist share it
//! - All writes go through a single persist funnel
//! - Only fatal errors escape `load()`
//! - Auto-save failures never lose in-memory state

mod builder;
mod collection;
mod errors;
mod lifecycle;
mod options;
mod pipeline;
mod singleton;

pub use builder::StoreBuilder;
pub use collection::CollectionStore;
pub use errors::{Severity, StoreError, StoreResult};
pub use lifecycle::{LoadOutcome, StoreState};
pub use options::{RemovalPersistPolicy, StoreOptions};
pub use singleton::SingletonStore;
