//! # File-backed Storage
//!
//! One JSON file per store directly under the base directory:
//! - `storage.<uid>.json` for collections
//! - `storage.singleton.<uid>.json` for singletons
//!
//! Writes go to `<name>.tmp` and are renamed into place, so a reader never
//! observes a half-written envelope.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::errors::{StorageError, StorageResult};
use super::locks::LocationLocks;
use super::service::StorageService;
use crate::metadata::StorageKey;

#[derive(Debug)]
pub struct FileStorage {
    base_dir: PathBuf,
    locks: LocationLocks<PathBuf>,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            locks: LocationLocks::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.base_dir.join(key.file_name())
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    fn write_atomic(path: &Path, text: &str) -> StorageResult<()> {
        let tmp = Self::temp_path(path);

        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(text.as_bytes())?;
            file.sync_all()
        });
        let result = written.and_then(|()| fs::rename(&tmp, path));

        if let Err(e) = result {
            // A failed write leaves no tmp file behind.
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::io(path.display().to_string(), e));
        }
        Ok(())
    }
}

impl StorageService for FileStorage {
    fn prepare(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_dir)
            .map_err(|e| StorageError::io(self.base_dir.display().to_string(), e))
    }

    fn size(&self, key: &StorageKey) -> StorageResult<u64> {
        let path = self.path_for(key);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StorageError::io(path.display().to_string(), e)),
        }
    }

    fn write(&self, key: &StorageKey, text: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        let lock = self.locks.lock_for(&path);
        let _guard = lock.lock();

        if !self.base_dir.exists() {
            self.prepare()?;
        }

        Self::write_atomic(&path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "Envelope written");
        Ok(())
    }

    fn read(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        let lock = self.locks.lock_for(&path);
        let _guard = lock.lock();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path.display().to_string(), e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        String::from_utf8(bytes).map(Some).map_err(|_| StorageError::Encoding {
            location: path.display().to_string(),
        })
    }

    fn delete(&self, key: &StorageKey) -> StorageResult<()> {
        let path = self.path_for(key);
        let lock = self.locks.lock_for(&path);
        let _guard = lock.lock();

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Envelope deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path.display().to_string(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::StoreShape;
    use tempfile::TempDir;

    fn key(uid: &str) -> StorageKey {
        StorageKey::new(uid, StoreShape::Collection)
    }

    #[test]
    fn test_write_read() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());

        storage.write(&key("a"), "{\"x\":1}").unwrap();
        assert_eq!(storage.read(&key("a")).unwrap().as_deref(), Some("{\"x\":1}"));
        assert!(temp.path().join("storage.a.json").exists());
        assert!(!temp.path().join("storage.a.json.tmp").exists());
    }

    #[test]
    fn test_failed_write_removes_tmp() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        // A directory at the target path makes the rename fail.
        fs::create_dir(storage.path_for(&key("x"))).unwrap();

        assert!(storage.write(&key("x"), "{}").is_err());
        assert!(!temp.path().join("storage.x.json.tmp").exists());
        assert!(storage.path_for(&key("x")).is_dir());
    }

    #[test]
    fn test_singleton_file_name() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        let key = StorageKey::new("prefs", StoreShape::Singleton);

        storage.write(&key, "{}").unwrap();
        assert!(temp.path().join("storage.singleton.prefs.json").exists());
    }

    #[test]
    fn test_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        assert!(storage.read(&key("nope")).unwrap().is_none());
        assert_eq!(storage.size(&key("nope")).unwrap(), 0);
    }

    #[test]
    fn test_empty_is_none() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());
        fs::write(temp.path().join("storage.blank.json"), "  \n").unwrap();
        assert!(storage.read(&key("blank")).unwrap().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path());

        storage.write(&key("gone"), "{}").unwrap();
        storage.delete(&key("gone")).unwrap();
        storage.delete(&key("gone")).unwrap();
        assert!(storage.read(&key("gone")).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_base_dir() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("nested").join("dir"));
        storage.write(&key("a"), "{}").unwrap();
        assert!(storage.size(&key("a")).unwrap() > 0);
    }
}
