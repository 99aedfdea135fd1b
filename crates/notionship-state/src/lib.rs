//! # Notionship State
//!
//! Document persistence and change subscriptions.

pub mod persist;
pub mod store;
pub mod subscription;

pub use persist::{load_document, LoadSource, LoadedDocument, Persister};
pub use store::{DocumentStore, FileDocumentStore, InMemoryDocumentStore, DEFAULT_STORAGE_KEY};
pub use subscription::{OutlineEvent, SubscriptionManager};
