//! Persisted key-value stores for preferences.
//!
//! Storage layout of [`FilePreferenceStore`]:
//! ```text
//! ~/.local/share/miclo/
//! └── preferences/
//!     ├── deviceId
//!     ├── displayIntro
//!     ├── selectedCategory
//!     └── selectCategory
//! ```

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::error::{PersistenceReadError, PersistenceWriteError};

/// Directory under the data dir holding one file per preference.
const PREFERENCES_DIR: &str = "preferences";

/// String-keyed persisted store. `get` returns absent-or-string.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceReadError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceWriteError>;
}

/// File-backed store: one text file per key.
#[derive(Clone, Debug)]
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    /// Creates a store under `<data_dir>/preferences`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            dir: data_dir.join(PREFERENCES_DIR),
        }
    }

    /// Returns the directory holding the preference files.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Option<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| self.dir.join(key))
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceReadError> {
        let path = self
            .key_path(key)
            .ok_or_else(|| PersistenceReadError::InvalidKey(key.to_string()))?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content.trim_end_matches('\n').to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceReadError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceWriteError> {
        let path = self
            .key_path(key)
            .ok_or_else(|| PersistenceWriteError::InvalidKey(key.to_string()))?;

        // Ensure preferences directory exists
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceWriteError::Io {
                key: key.to_string(),
                path: self.dir.clone(),
                source,
            })?;

        tokio::fs::write(&path, value)
            .await
            .map_err(|source| PersistenceWriteError::Io {
                key: key.to_string(),
                path,
                source,
            })
    }
}

/// In-memory store, for embedding without a data directory and for tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceReadError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceWriteError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FilePreferenceStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FilePreferenceStore::new(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (store, _temp) = test_store();
        assert_eq!(store.get("deviceId").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_roundtrips() {
        let (store, _temp) = test_store();
        store.set("selectedCategory", "mask").await.unwrap();

        assert!(store.dir().exists());
        assert_eq!(
            store.get("selectedCategory").await.unwrap(),
            Some("mask".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let (store, _temp) = test_store();
        store.set("displayIntro", "YES").await.unwrap();
        store.set("displayIntro", "NO").await.unwrap();
        assert_eq!(store.get("displayIntro").await.unwrap(), Some("NO".to_string()));
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let (store, _temp) = test_store();
        assert!(matches!(
            store.get("../etc/passwd").await,
            Err(PersistenceReadError::InvalidKey(_))
        ));
        assert!(matches!(
            store.set("", "x").await,
            Err(PersistenceWriteError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_store_reports_io_error() {
        let temp_dir = TempDir::new().unwrap();
        // A file where the preferences directory should be.
        std::fs::write(temp_dir.path().join(PREFERENCES_DIR), "").unwrap();
        let store = FilePreferenceStore::new(temp_dir.path().to_path_buf());

        assert!(matches!(
            store.get("deviceId").await,
            Err(PersistenceReadError::Io { .. })
        ));
        assert!(store.set("deviceId", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryPreferenceStore::with_values([("deviceId", "abc")]);
        assert_eq!(store.get("deviceId").await.unwrap(), Some("abc".to_string()));
        store.set("deviceId", "def").await.unwrap();
        assert_eq!(store.get("deviceId").await.unwrap(), Some("def".to_string()));
    }
}
