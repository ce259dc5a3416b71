//! Snapshot persistence for the collections.

use crate::collections::Collections;
use crate::error::StoreError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// JSON snapshot file on local disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot atomically (temp file + rename).
    pub async fn save(&self, collections: &Collections) -> Result<(), StoreError> {
        let data = serde_json::to_vec(collections)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(bytes = data.len(), path = ?self.path, "Saved snapshot");
        Ok(())
    }

    /// Read the snapshot. A missing file yields empty collections.
    pub async fn load(&self) -> Result<Collections, StoreError> {
        if !fs::try_exists(&self.path).await? {
            info!(path = ?self.path, "Snapshot not found, starting with empty collections");
            return Ok(Collections::new());
        }

        let data = fs::read(&self.path).await?;
        if data.is_empty() {
            warn!(path = ?self.path, "Snapshot file is empty, starting with empty collections");
            return Ok(Collections::new());
        }

        let collections: Collections = serde_json::from_slice(&data)?;
        let stats = collections.stats();
        info!(
            path = ?self.path,
            version = collections.version(),
            users = stats.users,
            contacts = stats.contacts,
            messages = stats.messages,
            "Loaded snapshot"
        );
        Ok(collections)
    }
}

/// No persistence; data lives only as long as the process.
pub struct MemoryStore;

impl MemoryStore {
    pub async fn save(&self, _collections: &Collections) -> Result<(), StoreError> {
        Ok(())
    }

    pub async fn load(&self) -> Result<Collections, StoreError> {
        debug!("Memory store: returning empty collections");
        Ok(Collections::new())
    }
}

/// Persistence backend.
pub enum Store {
    File(FileStore),
    Memory(MemoryStore),
}

impl Store {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Store::File(FileStore::new(path))
    }

    pub fn memory() -> Self {
        Store::Memory(MemoryStore)
    }

    pub async fn save(&self, collections: &Collections) -> Result<(), StoreError> {
        match self {
            Store::File(s) => s.save(collections).await,
            Store::Memory(s) => s.save(collections).await,
        }
    }

    pub async fn load(&self) -> Result<Collections, StoreError> {
        match self {
            Store::File(s) => s.load().await,
            Store::Memory(s) => s.load().await,
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Store::File(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewContact, User};

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("contacts.json"));

        let mut collections = Collections::new();
        collections.insert_user(User::new("Ann", "ann@example.com", "1", "hash"));
        collections
            .insert_contact(NewContact::new("Jane", "Doe", "5551234567", "j@x.io").into_contact("+91"));
        store.save(&collections).await.unwrap();

        let restored = store.load().await.unwrap();
        assert_eq!(restored.stats(), collections.stats());
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));

        let collections = store.load().await.unwrap();
        assert_eq!(collections.stats().contacts, 0);
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, b"{not json").unwrap();

        let result = FileStore::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_memory_store_forgets() {
        let store = Store::memory();
        let mut collections = Collections::new();
        collections.insert_user(User::new("Ann", "ann@example.com", "1", "hash"));

        store.save(&collections).await.unwrap();
        assert_eq!(store.load().await.unwrap().stats().users, 0);
        assert!(!store.is_persistent());
    }
}
