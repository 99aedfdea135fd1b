//! Error types for Notionship.
//!
//! Editing operations never fail; these errors only arise in the plumbing
//! around the model (serialization and storage).

use thiserror::Error;

/// Main error type for Notionship operations.
#[derive(Error, Debug, Clone)]
pub enum NotionshipError {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A persisted document parsed but violates a document invariant.
    #[error("Malformed document: {message}")]
    MalformedDocument { message: String },

    /// Storage backend error.
    #[error("Storage error: {message}")]
    StorageError { message: String },
}

impl NotionshipError {
    /// Returns true if this error means the persisted data is unusable and
    /// should be treated as absent.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            NotionshipError::SerializationError(_) | NotionshipError::MalformedDocument { .. }
        )
    }
}

/// Convenience Result type for Notionship operations.
pub type Result<T> = std::result::Result<T, NotionshipError>;

impl From<serde_json::Error> for NotionshipError {
    fn from(err: serde_json::Error) -> Self {
        NotionshipError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for NotionshipError {
    fn from(err: std::io::Error) -> Self {
        NotionshipError::StorageError {
            message: err.to_string(),
        }
    }
}
