//! Persistence policy for stores

use serde::{Deserialize, Serialize};

/// When remove-family operations (`remove`, `remove_all`, `remove_if`)
/// persist in auto-save mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPersistPolicy {
    /// Persist after every removal call, even if nothing was removed
    #[default]
    Always,
    /// Persist only when the set actually changed
    OnChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Persist immediately after every mutation
    pub auto_save: bool,
    pub removal_persist: RemovalPersistPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            auto_save: true,
            removal_persist: RemovalPersistPolicy::Always,
        }
    }
}

impl StoreOptions {
    /// Options with auto-save disabled; callers persist with `save()`.
    pub fn manual() -> Self {
        Self {
            auto_save: false,
            ..Self::default()
        }
    }

    pub fn with_removal_persist(mut self, policy: RemovalPersistPolicy) -> Self {
        self.removal_persist = policy;
        self
    }
}

/// Mutation families, each with its own auto-save trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    /// `add`, `add_all`, `retain_all`: persist on change
    Insert,
    /// `remove`, `remove_all`, `remove_if`: governed by `RemovalPersistPolicy`
    Remove,
    /// `clear` and singleton `set`: always persist
    Reset,
}

impl StoreOptions {
    pub(crate) fn should_persist(&self, mutation: Mutation, changed: bool) -> bool {
        if !self.auto_save {
            return false;
        }
        match mutation {
            Mutation::Insert => changed,
            Mutation::Remove => changed || self.removal_persist == RemovalPersistPolicy::Always,
            Mutation::Reset => true,
        }
    }
}
