//! Store metadata: identity, declared version, shape and timestamps

use std::fmt;

use chrono::{DateTime, Utc};

/// Whether a store holds a set of values or at most one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreShape {
    Collection,
    Singleton,
}

impl StoreShape {
    pub fn is_singleton(&self) -> bool {
        matches!(self, StoreShape::Singleton)
    }

    pub fn from_singleton_flag(singleton: bool) -> Self {
        if singleton {
            StoreShape::Singleton
        } else {
            StoreShape::Collection
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreShape::Collection => "collection",
            StoreShape::Singleton => "singleton",
        }
    }
}

impl fmt::Display for StoreShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a backing location, derived from metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub uid: String,
    pub shape: StoreShape,
}

impl StorageKey {
    pub fn new(uid: impl Into<String>, shape: StoreShape) -> Self {
        Self {
            uid: uid.into(),
            shape,
        }
    }

    /// File name under the storage base directory.
    ///
    /// `storage.<uid>.json` for collections,
    /// `storage.singleton.<uid>.json` for singletons.
    pub fn file_name(&self) -> String {
        match self.shape {
            StoreShape::Collection => format!("storage.{}.json", self.uid),
            StoreShape::Singleton => format!("storage.singleton.{}.json", self.uid),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.shape, self.uid)
    }
}

/// The envelope wrapping a store payload.
///
/// `uid`, `payload_type_version` and `shape` are fixed at construction.
#[derive(Debug, Clone)]
pub struct StoreMetadata<T> {
    uid: String,
    payload_type_version: u32,
    shape: StoreShape,
    created: DateTime<Utc>,
    modified: Option<DateTime<Utc>>,
    payload: Option<T>,
}

impl<T> StoreMetadata<T> {
    /// Creates transient metadata with no payload.
    pub fn new(uid: impl Into<String>, payload_type_version: u32, shape: StoreShape) -> Self {
        Self {
            uid: uid.into(),
            payload_type_version,
            shape,
            created: Utc::now(),
            modified: None,
            payload: None,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn payload_type_version(&self) -> u32 {
        self.payload_type_version
    }

    pub fn shape(&self) -> StoreShape {
        self.shape
    }

    pub fn is_singleton(&self) -> bool {
        self.shape.is_singleton()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    pub fn storage_key(&self) -> StorageKey {
        StorageKey::new(self.uid.clone(), self.shape)
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.payload.as_mut()
    }

    pub(crate) fn payload_or_insert_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        self.payload.get_or_insert_with(f)
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub(crate) fn set_payload(&mut self, payload: T) {
        self.payload = Some(payload);
    }

    pub(crate) fn replace_payload(&mut self, payload: Option<T>) -> Option<T> {
        std::mem::replace(&mut self.payload, payload)
    }

    /// Adopts timestamps read back from a persisted envelope.
    pub(crate) fn restore_timestamps(
        &mut self,
        created: Option<DateTime<Utc>>,
        modified: Option<DateTime<Utc>>,
    ) {
        if let Some(created) = created {
            self.created = created;
        }
        self.modified = modified;
    }

    /// Stamps a successful persist.
    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.modified = Some(at);
    }

    /// Copies the metadata without its payload.
    pub fn header(&self) -> StoreMetadata<()> {
        StoreMetadata {
            uid: self.uid.clone(),
            payload_type_version: self.payload_type_version,
            shape: self.shape,
            created: self.created,
            modified: self.modified,
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(
            StorageKey::new("users", StoreShape::Collection).file_name(),
            "storage.users.json"
        );
        assert_eq!(
            StorageKey::new("settings", StoreShape::Singleton).file_name(),
            "storage.singleton.settings.json"
        );
    }

    #[test]
    fn test_new_metadata_is_transient() {
        let meta: StoreMetadata<Vec<u8>> = StoreMetadata::new("a", 3, StoreShape::Collection);
        assert_eq!(meta.uid(), "a");
        assert_eq!(meta.payload_type_version(), 3);
        assert!(!meta.has_payload());
        assert!(meta.modified().is_none());
    }

    #[test]
    fn test_touch_sets_modified() {
        let mut meta: StoreMetadata<()> = StoreMetadata::new("a", 0, StoreShape::Singleton);
        let now = Utc::now();
        meta.touch(now);
        assert_eq!(meta.modified(), Some(now));
        assert!(meta.header().modified().is_some());
    }
}
