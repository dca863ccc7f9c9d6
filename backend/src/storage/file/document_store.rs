use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use super::FileStore;
use crate::storage::merge::apply_write;
use crate::storage::{Document, DocumentStore, StoreError};

impl FileStore {
    async fn read_document(path: &Path) -> Result<Option<Document>, StoreError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(document) => Ok(Some(document)),
            other => Err(StoreError::Corrupt(format!(
                "{} does not hold a JSON object (found {})",
                path.display(),
                json_type_name(&other)
            ))),
        }
    }

    /// Atomic write using a temp file next to the target
    async fn write_document(path: &Path, document: &Document) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(document)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, path).await?;
        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let path = self.connection.document_path(collection, id)?;
        let document = Self::read_document(&path).await?;
        debug!("Read {}/{} (found: {})", collection, id, document.is_some());
        Ok(document)
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        let path = self.connection.document_path(collection, id)?;
        let existing = if merge {
            Self::read_document(&path).await?
        } else {
            None
        };

        let document = apply_write(existing, fields, merge);
        Self::write_document(&path, &document).await?;

        info!("Saved {}/{} (merge: {})", collection, id, merge);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.connection.document_path(collection, id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}/{}", collection, id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
