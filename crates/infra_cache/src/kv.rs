//! Synchronous key-value storage
//!
//! The quick tier: small, string-valued, and synchronous so that the cache
//! can be hydrated before anything async has started. The file backend keeps
//! the whole map in one JSON document and replaces it atomically on write.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CacheError;

/// String-keyed, string-valued synchronous storage
pub trait KvStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove_item(&self, key: &str) -> Result<(), CacheError>;
}

fn lock_error<T>(_: T) -> CacheError {
    CacheError::Storage("key-value storage lock poisoned".to_string())
}

/// Process-local storage, mainly for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryKvStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKvStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryKvStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.items.lock().map_err(lock_error)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.items
            .lock()
            .map_err(lock_error)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        self.items.lock().map_err(lock_error)?.remove(key);
        Ok(())
    }
}

/// One JSON file holding the whole map
#[derive(Debug)]
pub struct FileKvStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKvStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, CacheError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(map)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KvStorage for FileKvStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let _guard = self.lock.lock().map_err(lock_error)?;
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let _guard = self.lock.lock().map_err(lock_error)?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        let _guard = self.lock.lock().map_err(lock_error)?;
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let kv = MemoryKvStorage::new();
        assert_eq!(kv.get_item("a").unwrap(), None);
        kv.set_item("a", "1").unwrap();
        assert_eq!(kv.get_item("a").unwrap().as_deref(), Some("1"));
        kv.remove_item("a").unwrap();
        assert_eq!(kv.get_item("a").unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kv.json");

        FileKvStorage::new(&path).set_item("blob", "{\"v\":1}").unwrap();
        FileKvStorage::new(&path).set_item("other", "x").unwrap();

        let reopened = FileKvStorage::new(&path);
        assert_eq!(reopened.get_item("blob").unwrap().as_deref(), Some("{\"v\":1}"));
        assert_eq!(reopened.get_item("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKvStorage::new(dir.path().join("absent.json"));
        assert_eq!(kv.get_item("anything").unwrap(), None);
        kv.remove_item("anything").unwrap();
    }

    #[test]
    fn test_file_storage_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.json");
        fs::write(&path, "not json").unwrap();

        let result = FileKvStorage::new(&path).get_item("blob");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
