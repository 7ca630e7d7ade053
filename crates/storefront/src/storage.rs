//! File-backed persistent storage.
//!
//! Each key becomes one JSON file under the data directory. Scoped keys
//! (`<visitor>/<key>`) land in one sub-directory per visitor:
//!
//! ```text
//! data/
//!   3f0c.../solestyleCart.json
//!   3f0c.../solestyleOrders.json
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use solestyle_core::storage::{SCOPE_SEPARATOR, Storage, StorageError};
use uuid::Uuid;

const EXTENSION: &str = "json";

/// Storage that survives restarts.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the scopes (visitors) that have stored anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be listed.
    pub fn scopes(&self) -> Result<Vec<String>, StorageError> {
        let mut scopes = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                scopes.push(name.to_owned());
            }
        }
        scopes.sort();
        Ok(scopes)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        for segment in key.split(SCOPE_SEPARATOR) {
            if !is_safe_segment(segment) {
                return Err(StorageError::InvalidKey(key.to_owned()));
            }
            path.push(segment);
        }
        path.set_extension(EXTENSION);
        Ok(path)
    }
}

/// Letters, digits, `-` and `_` only; keeps keys from escaping the root.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so readers never see a half-written document.
        let tmp = path.with_extension(format!("{EXTENSION}.{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use solestyle_core::storage::{ScopedStorage, keys};

    use super::*;

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.get_item(keys::CART).unwrap(), None);
        storage.set_item(keys::CART, r#"{"items":[]}"#).unwrap();
        assert_eq!(
            storage.get_item(keys::CART).unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
        assert!(dir.path().join("solestyleCart.json").exists());

        storage.remove_item(keys::CART).unwrap();
        storage.remove_item(keys::CART).unwrap();
        assert_eq!(storage.get_item(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_scoped_keys_use_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        let visitor = ScopedStorage::new(&storage, "visitor-1");

        visitor.set_item(keys::ORDERS, "[]").unwrap();
        assert!(dir.path().join("visitor-1").join("solestyleOrders.json").exists());
        assert_eq!(storage.scopes().unwrap(), vec!["visitor-1"]);
    }

    #[test]
    fn test_rejects_unsafe_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        for key in ["../escape", "a/../../b", "", "a//b", "a.b"] {
            assert!(
                matches!(storage.set_item(key, "x"), Err(StorageError::InvalidKey(_))),
                "{key}"
            );
        }
    }

    #[test]
    fn test_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set_item("k", "1").unwrap();
        storage.set_item("k", "2").unwrap();

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("2"));
    }
}
