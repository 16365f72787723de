//! Key-value config store
//!
//! Pass-through persistence for the credential and remembered identifiers.
//! No validation or encryption; values are visible to every process run by
//! the same user.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::PanelError;
use crate::filesys::file::File;

/// Stored credential
pub const TOKEN_KEY: &str = "github_token";

/// Remembered owner of the workflow repository
pub const OWNER_KEY: &str = "github_owner";

/// Remembered name of the workflow repository
pub const REPO_KEY: &str = "github_repo";

/// Key-value store trait for testability
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PanelError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PanelError>;

    /// Remove every key in `keys`; missing keys are ignored
    async fn clear(&self, keys: &[&str]) -> Result<(), PanelError>;
}

/// Store backed by a JSON document on disk
pub struct FileStore {
    file: File,
    // serializes read-modify-write cycles on the document
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(file: File) -> Self {
        Self {
            file,
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, PanelError> {
        self.file
            .read_json_opt()
            .await
            .map(Option::unwrap_or_default)
            .map_err(|e| PanelError::StorageError(format!("{:?}: {}", self.file.path(), e)))
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), PanelError> {
        self.file.write_json(entries).await?;
        self.file.set_permissions_600().await
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PanelError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PanelError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await?;
        debug!("Stored key {}", key);
        Ok(())
    }

    async fn clear(&self, keys: &[&str]) -> Result<(), PanelError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() != before {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PanelError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PanelError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self, keys: &[&str]) -> Result<(), PanelError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// Clear the credential and the remembered repository
pub async fn clear_credentials(store: &dyn KeyValueStore) -> Result<(), PanelError> {
    store.clear(&[TOKEN_KEY, OWNER_KEY, REPO_KEY]).await
}
