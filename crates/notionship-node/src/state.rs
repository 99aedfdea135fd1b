//! Application state.

use std::sync::Arc;

use notionship_state::{
    load_document, DocumentStore, FileDocumentStore, InMemoryDocumentStore, Persister,
    SubscriptionManager,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::NodeConfig;
use crate::engine::{Engine, EventFocus};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The editing session. One command at a time.
    pub engine: Arc<Mutex<Engine>>,

    /// Event fan-out for WebSocket subscribers.
    pub events: Arc<SubscriptionManager>,
}

impl AppState {
    /// Open the configured store, seed the document and start the persister.
    ///
    /// Returns the state and the persister task, which finishes once every
    /// clone of the state has been dropped.
    pub async fn bootstrap(config: &NodeConfig) -> (Self, JoinHandle<()>) {
        let store: Arc<dyn DocumentStore> = match &config.data_dir {
            Some(dir) => {
                info!("Using file store at {}", dir.display());
                Arc::new(FileDocumentStore::new(dir.clone()))
            }
            None => {
                info!("Using in-memory store; edits are lost on exit");
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        Self::with_store(store, config).await
    }

    /// Like [`AppState::bootstrap`] with an explicit store.
    pub async fn with_store(
        store: Arc<dyn DocumentStore>,
        config: &NodeConfig,
    ) -> (Self, JoinHandle<()>) {
        let loaded = load_document(store.as_ref(), &config.storage_key).await;
        let (persister, writer) = Persister::spawn(store, config.storage_key.clone());

        let events = Arc::new(SubscriptionManager::new(config.event_buffer));
        let focus = Box::new(EventFocus::new(events.clone()));
        let engine = Engine::new(loaded, persister, focus, events.clone());

        let state = Self {
            engine: Arc::new(Mutex::new(engine)),
            events,
        };

        (state, writer)
    }

    /// Stop accepting saves so the persister task can finish, regardless of
    /// how many clones of the state are still held by open connections.
    pub async fn shutdown(&self) {
        self.engine.lock().await.close_persister();
    }
}
