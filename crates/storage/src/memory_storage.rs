//! In-memory document store.
//!
//! Used by tests and demos. It can simulate an unreachable store, denied
//! collections and network latency.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::document::Document;
use crate::trait_::{validate_key, DocumentStore, Result, StoreError};

/// Document store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    denied: RwLock<HashSet<String>>,
    offline: AtomicBool,
    latency: Option<Duration>,
    list_calls: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every read by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every operation fail as unreachable until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Deny reads of a collection.
    pub async fn deny(&self, collection: impl Into<String>) {
        self.denied.write().await.insert(collection.into());
    }

    /// Number of `list_documents` calls served so far, including failed ones.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        validate_key(collection)?;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.check_online()?;
        if self.denied.read().await.contains(collection) {
            return Err(StoreError::Unauthorized(format!(
                "no read access to collection {}",
                collection
            )));
        }

        let docs = self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default();
        debug!("Listed {} documents from {}", docs.len(), collection);
        Ok(docs)
    }

    async fn put_document(&self, collection: &str, document: &Document) -> Result<()> {
        validate_key(collection)?;
        validate_key(&document.id)?;
        self.check_online()?;

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document.clone(),
            None => docs.push(document.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list_documents("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces_same_id() {
        let store = MemoryStore::new();
        store
            .put_document("u1", &Document::new("thesis").with_field("projectDueDate", 1))
            .await
            .unwrap();
        store
            .put_document("u1", &Document::new("thesis").with_field("projectDueDate", 2))
            .await
            .unwrap();
        store.put_document("u1", &Document::new("essay")).await.unwrap();

        let docs = store.list_documents("u1").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get("projectDueDate"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_offline_and_denied() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.list_documents("u1").await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_offline(false);
        store.deny("u1").await;
        assert!(matches!(
            store.list_documents("u1").await,
            Err(StoreError::Unauthorized(_))
        ));
        assert!(store.list_documents("u2").await.is_ok());
        assert_eq!(store.list_calls(), 3);
    }
}
