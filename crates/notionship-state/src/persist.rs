//! Loading and fire-and-forget saving of documents.
//!
//! Loading never fails: a missing slot, an unreadable store or a malformed
//! payload all fall back to the default single-row document. Only the first
//! and last of those make the fallback safe to write back; an unreadable
//! store may still hold the user's rows. Saving is queued to a background
//! task; callers never wait for it and never hear about failures, which are
//! only logged.

use std::sync::Arc;

use notionship_core::Document;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::store::DocumentStore;

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Parsed from the slot.
    Stored,
    /// Default document: the slot was empty or held unusable data.
    Fresh,
    /// Default document: the store could not be read.
    Unavailable,
}

/// Result of [`load_document`].
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: Document,
    pub source: LoadSource,
}

impl LoadedDocument {
    /// A default document standing in for an empty or unusable slot.
    pub fn fresh() -> Self {
        Self {
            document: Document::default(),
            source: LoadSource::Fresh,
        }
    }

    /// Whether the document may be written to the slot before the first edit.
    pub fn may_overwrite(&self) -> bool {
        self.source != LoadSource::Unavailable
    }
}

/// Read the document stored under `key`, or the default document.
pub async fn load_document(store: &dyn DocumentStore, key: &str) -> LoadedDocument {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("No document in slot '{}', starting fresh", key);
            return LoadedDocument::fresh();
        }
        Err(e) if e.is_corrupt_data() => {
            warn!("Stored document in slot '{}' is unusable, starting fresh: {}", key, e);
            return LoadedDocument::fresh();
        }
        Err(e) => {
            warn!(
                "Failed to read slot '{}', starting fresh without saving: {}",
                key, e
            );
            return LoadedDocument {
                document: Document::default(),
                source: LoadSource::Unavailable,
            };
        }
    };

    match Document::from_json(&raw) {
        Ok(document) => {
            info!(
                "Loaded {} rows from {} store slot '{}'",
                document.len(),
                store.name(),
                key
            );
            LoadedDocument {
                document,
                source: LoadSource::Stored,
            }
        }
        Err(e) => {
            warn!("Stored document in slot '{}' is unusable, starting fresh: {}", key, e);
            LoadedDocument::fresh()
        }
    }
}

/// Handle for queueing document saves.
///
/// Dropping every handle lets the writer task drain its queue and stop.
#[derive(Clone)]
pub struct Persister {
    tx: mpsc::UnboundedSender<Document>,
}

impl Persister {
    /// Start the writer task on the current Tokio runtime.
    pub fn spawn(store: Arc<dyn DocumentStore>, key: impl Into<String>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(store, key.into(), rx));
        (Self { tx }, handle)
    }

    /// Queue `document` for saving and return immediately.
    pub fn notify(&self, document: &Document) {
        if self.tx.send(document.clone()).is_err() {
            warn!("Persister has stopped, dropping save");
        }
    }
}

async fn run_writer(
    store: Arc<dyn DocumentStore>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<Document>,
) {
    let mut last_saved: Option<String> = None;

    while let Some(mut document) = rx.recv().await {
        // Only the newest queued state is worth writing.
        while let Ok(newer) = rx.try_recv() {
            document = newer;
        }

        let fingerprint = document.fingerprint();
        if last_saved.as_deref() == Some(fingerprint.as_str()) {
            continue;
        }

        let raw = match document.to_json() {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to serialize document: {}", e);
                continue;
            }
        };

        match store.set(&key, raw).await {
            Ok(()) => {
                debug!("Saved {} rows to slot '{}'", document.len(), key);
                last_saved = Some(fingerprint);
            }
            Err(e) => warn!("Failed to save slot '{}': {}", key, e),
        }
    }

    debug!("Persister for slot '{}' stopped", key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryDocumentStore, DEFAULT_STORAGE_KEY};
    use async_trait::async_trait;
    use notionship_core::{NotionshipError, Result, Row};

    /// Store whose reads and writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(NotionshipError::StorageError {
                message: "disk on fire".to_string(),
            })
        }

        async fn set(&self, _key: &str, _value: String) -> Result<()> {
            Err(NotionshipError::StorageError {
                message: "disk on fire".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn sample() -> Document {
        Document::new(vec![Row::default().with_text("a"), Row::default().with_text("b")]).unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_falls_back() {
        let store = InMemoryDocumentStore::new();
        let loaded = load_document(&store, DEFAULT_STORAGE_KEY).await;

        assert_eq!(loaded.source, LoadSource::Fresh);
        assert_eq!(loaded.document.len(), 1);
        assert!(loaded.document.rows()[0].is_empty());
    }

    #[tokio::test]
    async fn test_load_malformed_falls_back() {
        let store = InMemoryDocumentStore::new();

        for raw in ["{not json", "[]", r#"{"id":1}"#] {
            store.set(DEFAULT_STORAGE_KEY, raw.to_string()).await.unwrap();
            let loaded = load_document(&store, DEFAULT_STORAGE_KEY).await;
            assert_eq!(loaded.source, LoadSource::Fresh);
            assert!(loaded.may_overwrite());
            assert_eq!(loaded.document.len(), 1);
            assert!(loaded.document.rows()[0].is_empty());
        }
    }

    #[tokio::test]
    async fn test_load_store_error_falls_back() {
        let loaded = load_document(&BrokenStore, DEFAULT_STORAGE_KEY).await;
        assert_eq!(loaded.source, LoadSource::Unavailable);
        assert!(!loaded.may_overwrite());
        assert_eq!(loaded.document.len(), 1);
    }

    #[tokio::test]
    async fn test_load_non_utf8_file_falls_back_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(format!("{DEFAULT_STORAGE_KEY}.json")),
            [0xc3, 0x28, 0xff],
        )
        .unwrap();
        let store = crate::store::FileDocumentStore::new(dir.path());

        let loaded = load_document(&store, DEFAULT_STORAGE_KEY).await;
        assert_eq!(loaded.source, LoadSource::Fresh);
        assert!(loaded.may_overwrite());
    }

    #[tokio::test]
    async fn test_load_existing() {
        let store = InMemoryDocumentStore::new();
        let document = sample();
        store
            .set(DEFAULT_STORAGE_KEY, document.to_json().unwrap())
            .await
            .unwrap();

        let loaded = load_document(&store, DEFAULT_STORAGE_KEY).await;
        assert_eq!(loaded.source, LoadSource::Stored);
        assert_eq!(loaded.document, document);
    }

    #[tokio::test]
    async fn test_persister_writes_latest() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let (persister, handle) = Persister::spawn(store.clone(), DEFAULT_STORAGE_KEY);

        let first = sample();
        let id = first.rows()[0].id;
        let second = first.set_text(id, "changed");

        persister.notify(&first);
        persister.notify(&second);
        drop(persister);
        handle.await.unwrap();

        let stored = load_document(store.as_ref(), DEFAULT_STORAGE_KEY).await;
        assert_eq!(stored.document, second);
    }

    #[tokio::test]
    async fn test_persister_skips_identical_saves() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let (persister, handle) = Persister::spawn(store.clone(), DEFAULT_STORAGE_KEY);

        let document = sample();
        persister.notify(&document);
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while store.version().await < 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        persister.notify(&document);
        drop(persister);
        handle.await.unwrap();

        assert_eq!(store.version().await, 1);
    }

    #[tokio::test]
    async fn test_persister_survives_store_failures() {
        let (persister, handle) = Persister::spawn(Arc::new(BrokenStore), DEFAULT_STORAGE_KEY);

        persister.notify(&sample());
        persister.notify(&Document::default());
        drop(persister);

        // The writer logs and keeps going until the queue closes.
        handle.await.unwrap();
    }
}
