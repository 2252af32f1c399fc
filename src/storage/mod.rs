//! Storage Service subsystem for stashdb
//!
//! Stores depend only on the `StorageService` trait. Two backends ship
//! with the crate, a file-backed one and in-memory ones for tests and
//! ephemeral stores.
//!
//! # Design Principles
//!
//! - One backing location per store, derived from its `StorageKey`
//! - Per-location locks, never a global lock
//! - Absent and empty content both read as `None`

mod errors;
mod file;
mod locks;
mod memory;
mod service;

pub use errors::{StorageError, StorageResult};
pub use file::FileStorage;
pub use locks::LocationLocks;
pub use memory::{MemoryStorage, NoopStorage};
pub use service::StorageService;
