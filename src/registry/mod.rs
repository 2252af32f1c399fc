//! Store Registry for stashdb
//!
//! Applications that manage many stores register them here and drive
//! their lifecycle in bulk. The registry is an ordinary owned value; there
//! is no process-wide instance.

mod errors;
mod managed;
mod stores;

pub use errors::{RegistryError, RegistryResult};
pub use managed::ManagedStore;
pub use stores::StoreRegistry;
