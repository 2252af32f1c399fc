//! Version migration handlers and the per-store migration table

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::errors::{MigrationError, MigrationResult, MigrationStepError};
use crate::document::Document;

type TransformFn = dyn Fn(&mut Document) -> Result<(), MigrationStepError> + Send + Sync;

/// Adapts a document at `source_version` into one valid at `source_version + 1`.
///
/// For collection stores the transform sees one element at a time; for
/// singleton stores it sees the whole value.
#[derive(Clone)]
pub struct MigrationHandler {
    source_version: u32,
    transform: Arc<TransformFn>,
}

impl MigrationHandler {
    pub fn new<F>(source_version: u32, transform: F) -> Self
    where
        F: Fn(&mut Document) -> Result<(), MigrationStepError> + Send + Sync + 'static,
    {
        Self {
            source_version,
            transform: Arc::new(transform),
        }
    }

    pub fn source_version(&self) -> u32 {
        self.source_version
    }

    pub fn apply(&self, doc: &mut Document) -> Result<(), MigrationStepError> {
        (self.transform)(doc)
    }
}

impl fmt::Debug for MigrationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationHandler")
            .field("source_version", &self.source_version)
            .finish_non_exhaustive()
    }
}

/// Handlers keyed by source version. Fixed once handed to a store.
#[derive(Debug, Clone, Default)]
pub struct MigrationTable {
    handlers: BTreeMap<u32, MigrationHandler>,
}

impl MigrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table, rejecting two handlers for the same version.
    pub fn from_handlers(handlers: impl IntoIterator<Item = MigrationHandler>) -> MigrationResult<Self> {
        let mut table = Self::new();
        for handler in handlers {
            table.insert(handler)?;
        }
        Ok(table)
    }

    /// Registers a transform for `source_version`.
    pub fn register<F>(&mut self, source_version: u32, transform: F) -> MigrationResult<()>
    where
        F: Fn(&mut Document) -> Result<(), MigrationStepError> + Send + Sync + 'static,
    {
        self.insert(MigrationHandler::new(source_version, transform))
    }

    pub fn insert(&mut self, handler: MigrationHandler) -> MigrationResult<()> {
        let version = handler.source_version();
        if self.handlers.contains_key(&version) {
            return Err(MigrationError::DuplicateHandler(version));
        }
        self.handlers.insert(version, handler);
        Ok(())
    }

    pub fn get(&self, source_version: u32) -> Option<&MigrationHandler> {
        self.handlers.get(&source_version)
    }

    /// Handlers whose source version lies in `[from, to)`, ascending.
    pub fn range(&self, from: u32, to: u32) -> impl Iterator<Item = &MigrationHandler> {
        let upper = if to > from { to } else { from };
        self.handlers.range(from..upper).map(|(_, h)| h)
    }

    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.handlers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
