//! In-process document and blob store.
//!
//! Cloning a [`MemoryStore`] yields another handle to the same data, so a
//! test can keep one handle for inspection while the backend owns another.

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::merge::apply_write;
use super::{BlobStore, Document, DocumentStore, StoreError};

#[derive(Default)]
struct MemoryState {
    documents: HashMap<(String, String), Document>,
    blobs: HashMap<String, (Vec<u8>, String)>,
    writes: usize,
    offline: bool,
}

/// Shared in-memory store implementing both adapter traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // The state is plain data, a panicked writer cannot leave it half-built
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(state: &MemoryState) -> Result<(), StoreError> {
        if state.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    /// Put a document in place without counting it as a client write
    pub fn seed_document(&self, collection: &str, id: &str, document: Document) {
        self.lock()
            .documents
            .insert((collection.to_string(), id.to_string()), document);
    }

    /// Current content of a document, bypassing the offline switch
    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.lock()
            .documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    /// Content type recorded for a blob at upload time
    pub fn blob_content_type(&self, path: &str) -> Option<String> {
        self.lock().blobs.get(path).map(|(_, content_type)| content_type.clone())
    }

    /// Number of document and blob writes accepted so far
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state
            .documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        Self::check_online(&state)?;

        let key = (collection.to_string(), id.to_string());
        let existing = state.documents.remove(&key);
        let document = apply_write(existing, fields, merge);
        state.documents.insert(key, document);
        state.writes += 1;

        debug!("memory store wrote {}/{} (merge: {})", collection, id, merge);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        state
            .documents
            .remove(&(collection.to_string(), id.to_string()));
        state.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload_blob(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        state
            .blobs
            .insert(path.to_string(), (bytes, content_type.to_string()));
        state.writes += 1;
        Ok(format!("memory://{}", path))
    }

    async fn download_blob(&self, path: &str, max_size: u64) -> Result<Vec<u8>, StoreError> {
        let state = self.lock();
        Self::check_online(&state)?;

        let (bytes, _) = state
            .blobs
            .get(path)
            .ok_or_else(|| StoreError::BlobNotFound(path.to_string()))?;

        let size = bytes.len() as u64;
        if size > max_size {
            return Err(StoreError::BlobTooLarge {
                path: path.to_string(),
                size,
                limit: max_size,
            });
        }
        Ok(bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_missing_document_is_none() {
        let store = MemoryStore::new();
        let result = store.get_document("users", "nobody").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_merge_write_keeps_other_fields() {
        let store = MemoryStore::new();
        store.seed_document("users", "acc", doc(json!({ "users": [], "keep": 1 })));

        store
            .set_document("users", "acc", doc(json!({ "users": [{ "user_name": "Aki" }] })), true)
            .await
            .unwrap();

        let stored = store.document("users", "acc").unwrap();
        assert_eq!(stored["keep"], json!(1));
        assert_eq!(stored["users"][0]["user_name"], json!("Aki"));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.get_document("users", "acc").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store
            .set_document("users", "acc", Document::new(), true)
            .await
            .is_err());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_blob_round_trip_and_size_limit() {
        let store = MemoryStore::new();
        let url = store
            .upload_blob("profile_images/Aki.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "memory://profile_images/Aki.jpg");
        assert_eq!(store.blob_content_type("profile_images/Aki.jpg").as_deref(), Some("image/jpeg"));
        assert_eq!(
            store.download_blob("profile_images/Aki.jpg", 3).await.unwrap(),
            vec![1, 2, 3]
        );
        assert!(matches!(
            store.download_blob("profile_images/Aki.jpg", 2).await,
            Err(StoreError::BlobTooLarge { size: 3, limit: 2, .. })
        ));
        assert!(matches!(
            store.download_blob("profile_images/Mio.jpg", 10).await,
            Err(StoreError::BlobNotFound(_))
        ));
    }
}
