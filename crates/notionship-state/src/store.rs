//! Document store implementations.
//!
//! The store is a plain key-value contract: one slot per document, holding
//! the serialized rows. Where the bytes live is up to the implementation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use notionship_core::{NotionshipError, Result};
use tokio::sync::RwLock;

/// Storage slot used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "notionship_todos_v1";

/// Trait for document stores.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get the current value for a key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set the value for a key.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// In-memory implementation of DocumentStore.
pub struct InMemoryDocumentStore {
    /// Latest value per key.
    state: Arc<RwLock<HashMap<String, String>>>,

    /// Global version counter.
    version: Arc<RwLock<u64>>,
}

impl InMemoryDocumentStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Number of writes accepted so far.
    pub async fn version(&self) -> u64 {
        *self.version.read().await
    }

    async fn bump_version(&self) {
        *self.version.write().await += 1;
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.read().await;
        Ok(state.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.state.write().await.insert(key.to_string(), value);
        self.bump_version().await;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// File-backed implementation of DocumentStore: one `<key>.json` per slot.
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(NotionshipError::StorageError {
                message: format!("invalid storage key {key:?}"),
            });
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            // Bytes that are not UTF-8 are a damaged payload, not a store fault.
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                Err(NotionshipError::SerializationError(format!(
                    "{} is not valid UTF-8: {}",
                    path.display(),
                    err
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        // Write to a sibling and rename so readers never see a torn file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value.as_bytes()).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
