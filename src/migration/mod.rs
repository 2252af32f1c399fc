//! Migration Engine for stashdb
//!
//! Stored payloads are rewritten version by version before typed binding.
//!
//! # Design Principles
//!
//! - Forward-only, monotonic version walk
//! - One handler per source version, each advancing exactly one version
//! - Handlers see a single collection element, never the wrapping sequence
//! - Stored versions newer than the code are always rejected

mod engine;
mod errors;
mod handler;

pub use engine::{migrate, MigrationContext, MigrationOutcome};
pub use errors::{MigrationError, MigrationResult, MigrationStepError};
pub use handler::{MigrationHandler, MigrationTable};
