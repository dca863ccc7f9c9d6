//! # Storage Traits
//!
//! The adapter contract the synchronization layer is written against. Every
//! call resolves exactly once, with a value or a [`StoreError`]; backends
//! own their own timeout and retry policy.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::StoreError;

/// A stored document: a JSON object keyed by wire field name
pub type Document = Map<String, Value>;

/// Key-path document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document. `Ok(None)` means the document does not exist.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Write fields into a document, creating it if needed.
    ///
    /// With `merge` the provided top-level fields replace their stored
    /// counterparts and all other fields are preserved; without it the
    /// document is replaced wholesale.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Binary object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at `path` and return a URL that refers to them
    async fn upload_blob(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError>;

    /// Read the bytes at `path`, refusing blobs larger than `max_size`
    async fn download_blob(&self, path: &str, max_size: u64) -> Result<Vec<u8>, StoreError>;
}
