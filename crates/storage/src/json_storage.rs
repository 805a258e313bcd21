//! JSON file storage implementation.
//!
//! Stores each collection as a directory under the root and each document as
//! `<collection>/<document id>.json`, the file body holding the fields.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::document::Document;
use crate::trait_::{validate_key, DocumentStore, Result};

/// File-based JSON document store.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_path(collection).join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl DocumentStore for JsonStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        validate_key(collection)?;
        let mut docs = list_dir(&self.collection_path(collection)).await?;
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        debug!("Loaded {} documents from {}", docs.len(), collection);
        Ok(docs)
    }

    async fn put_document(&self, collection: &str, document: &Document) -> Result<()> {
        validate_key(collection)?;
        validate_key(&document.id)?;

        fs::create_dir_all(self.collection_path(collection)).await?;
        let path = self.document_path(collection, &document.id);
        let json = serde_json::to_string_pretty(&document.fields)?;
        fs::write(&path, json.as_bytes()).await?;
        Ok(())
    }
}

async fn read_json(path: &Path) -> Result<Option<Value>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir(dir: &Path) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    let mut rd = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(docs),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            warn!("Skipping document with non UTF-8 name {}", path.display());
            continue;
        };
        match read_json(&path).await {
            Ok(Some(value)) => docs.push(Document::from_value(id, value)),
            Ok(None) => {}
            Err(e) => {
                warn!("Unreadable document {}: {}", path.display(), e);
                docs.push(Document::unreadable(id, e.to_string()));
            }
        }
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();

        let doc = Document::new("thesis")
            .with_field("projectDueDate", "2026-12-01T00:00:00Z")
            .with_field("milestones", json!([]));
        store.put_document("user-1", &doc).await.unwrap();
        store.put_document("user-1", &Document::new("essay")).await.unwrap();

        let docs = store.list_documents("user-1").await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["essay", "thesis"]);
        assert_eq!(docs[1], doc);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();
        assert!(store.list_documents("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_listed_as_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();
        store.put_document("u", &Document::new("good")).await.unwrap();
        std::fs::write(dir.path().join("u").join("bad.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("u").join("notes.txt"), "ignored").unwrap();

        let docs = store.list_documents("u").await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["bad", "good"]);
        assert!(docs[0].unreadable.is_some());
        assert!(docs[1].unreadable.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_file_name_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();
        store.put_document("u", &Document::new("good")).await.unwrap();
        let name = OsStr::from_bytes(b"bad\xff.json");
        if std::fs::write(dir.path().join("u").join(name), "{}").is_err() {
            // Filesystem refuses non UTF-8 names.
            return;
        }

        let docs = store.list_documents("u").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "good");
    }

    #[tokio::test]
    async fn test_rejects_path_escape() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();
        assert!(store.list_documents("../etc").await.is_err());
        assert!(store.put_document("u", &Document::new("../x")).await.is_err());
    }
}
