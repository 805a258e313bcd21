//! Document store trait abstraction.

use async_trait::async_trait;
use crate::document::Document;

/// Error type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur talking to the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Caller is not allowed to read the collection
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Collection or document key cannot be used as a store key
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remote document store holding one collection of project documents per user.
///
/// This trait allows different backends to be plugged in.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection. An unknown collection is empty.
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>>;

    /// Write a document, replacing any document with the same id.
    async fn put_document(&self, collection: &str, document: &Document) -> Result<()>;
}

/// Reject keys that would escape a collection or be ambiguous.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("user-1").is_ok());
        assert!(validate_key("01HZX3").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("..").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
    }
}
