//! Store lifecycle states and load outcomes
//!
//! ```text
//! Transient --load--> Loaded --mutate--> Mutated --save--> Persisted
//!     |                                     ^                 |
//!     +-------------mutate------------------+-----mutate------+
//! ```
//!
//! Dropping is terminal from any state and is modelled by consuming the
//! store, so it has no variant here.

use std::fmt;

use super::errors::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Constructed; nothing loaded from storage
    Transient,
    /// Payload populated from storage
    Loaded,
    /// Payload changed in memory since the last load or save
    Mutated,
    /// Payload written to storage
    Persisted,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreState::Transient => "transient",
            StoreState::Loaded => "loaded",
            StoreState::Mutated => "mutated",
            StoreState::Persisted => "persisted",
        };
        write!(f, "{}", name)
    }
}

/// Result of a non-fatal `load()`.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Backing storage absent or empty
    Empty,
    /// Stored content was discarded after a recoverable error (already logged)
    Skipped(StoreError),
    /// Payload populated
    Loaded {
        source_version: u32,
        migrated: bool,
    },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }

    pub fn migrated(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { migrated: true, .. })
    }

    pub fn skipped_error(&self) -> Option<&StoreError> {
        match self {
            LoadOutcome::Skipped(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_helpers() {
        let loaded = LoadOutcome::Loaded {
            source_version: 0,
            migrated: true,
        };
        assert!(loaded.is_loaded());
        assert!(loaded.migrated());
        assert!(!LoadOutcome::Empty.is_loaded());

        let skipped = LoadOutcome::Skipped(StoreError::Misconfigured("x".into()));
        assert!(skipped.skipped_error().is_some());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(StoreState::Transient.to_string(), "transient");
        assert_eq!(StoreState::Persisted.to_string(), "persisted");
    }
}
