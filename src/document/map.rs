//! Insertion-ordered string-keyed mapping used by `Document::Mapping`

use super::errors::{DocumentError, DocumentResult};
use super::value::Document;

/// An insertion-ordered mapping from string keys to documents.
///
/// Lookups are linear; record documents are small and field order must
/// survive a load-migrate-save cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMap {
    entries: Vec<(String, Document)>,
}

impl DocumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Inserts a value, returning the previous one.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: Document) -> Option<Document> {
        let key = key.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Document> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    /// Renames a key in place.
    ///
    /// Fails if `from` is absent or `to` is already taken by another key.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> DocumentResult<()> {
        let to = to.into();
        let idx = self
            .position(from)
            .ok_or_else(|| DocumentError::MissingField(from.to_string()))?;
        if from != to && self.contains_key(&to) {
            return Err(DocumentError::FieldExists(to));
        }
        self.entries[idx].0 = to;
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Document)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Document)> for DocumentMap {
    fn from_iter<I: IntoIterator<Item = (String, Document)>>(iter: I) -> Self {
        let mut map = DocumentMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for DocumentMap {
    type Item = (String, Document);
    type IntoIter = std::vec::IntoIter<(String, Document)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentMap {
        let mut map = DocumentMap::new();
        map.insert("a", Document::from(1));
        map.insert("b", Document::from("two"));
        map.insert("c", Document::Null);
        map
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut map = sample();
        map.insert("a", Document::from(10));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(map.get("a").and_then(Document::as_i64), Some(10));
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut map = sample();
        map.rename("b", "bee").unwrap();
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["a", "bee", "c"]);
    }

    #[test]
    fn test_rename_missing() {
        let mut map = sample();
        assert!(matches!(
            map.rename("zzz", "y"),
            Err(DocumentError::MissingField(_))
        ));
    }

    #[test]
    fn test_rename_onto_existing() {
        let mut map = sample();
        assert!(matches!(
            map.rename("a", "c"),
            Err(DocumentError::FieldExists(_))
        ));
    }

    #[test]
    fn test_remove() {
        let mut map = sample();
        assert!(map.remove("b").is_some());
        assert!(map.remove("b").is_none());
        assert_eq!(map.len(), 2);
    }
}
