//! Configuration for stashdb
//!
//! A single JSON file describes where stores live and how they persist.
//! Every optional field has a serde default, so `{"base_dir": "..."}` is
//! a complete configuration.

mod errors;
mod stash;

pub use errors::{ConfigError, ConfigResult};
pub use stash::{StashConfig, StoreOverride};
