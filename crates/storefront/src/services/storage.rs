//! Durable local key-value storage.
//!
//! Mirrors browser local storage: string keys map to string values, and
//! structured values are stored as JSON text. The whole map lives in one JSON
//! file. A missing or unreadable file reads as empty storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{instrument, warn};

/// Errors that can occur while writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded.
    #[error("storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// File-backed local key-value storage.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Open storage backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value. Absent or malformed storage yields `None`.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.load().await.remove(key)
    }

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be written.
    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    pub async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.load().await;
        entries.insert(key.to_string(), value);
        self.save(&entries).await
    }

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be written.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load().await;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }

    async fn load(&self) -> BTreeMap<String, String> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read local storage");
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring malformed local storage");
            BTreeMap::new()
        })
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get("anything").await, None);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested/store.json"));

        storage.set("theme", "dark".to_string()).await.unwrap();
        assert_eq!(storage.get("theme").await.as_deref(), Some("dark"));

        storage.remove("theme").await.unwrap();
        assert_eq!(storage.get("theme").await, None);
    }

    #[tokio::test]
    async fn test_malformed_file_reads_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = LocalStorage::new(&path);
        assert_eq!(storage.get("key").await, None);

        storage.set("key", "value".to_string()).await.unwrap();
        assert_eq!(storage.get("key").await.as_deref(), Some("value"));
    }
}
