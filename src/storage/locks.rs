//! Per-location lock table

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// Hands out one mutex per backing location.
///
/// Independent locations never share a lock. Entries are kept for the
/// lifetime of the table; the number of stores is small and fixed.
#[derive(Debug)]
pub struct LocationLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> LocationLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn lock_for(&self, location: &K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(location.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone> Default for LocationLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_location_same_lock() {
        let locks = LocationLocks::new();
        let a = locks.lock_for(&"a".to_string());
        let b = locks.lock_for(&"a".to_string());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_independent_locations() {
        let locks = LocationLocks::new();
        let a = locks.lock_for(&"a".to_string());
        let b = locks.lock_for(&"b".to_string());
        assert!(!Arc::ptr_eq(&a, &b));

        let _held = a.lock();
        assert!(b.try_lock().is_some());
        assert_eq!(locks.len(), 2);
    }
}
