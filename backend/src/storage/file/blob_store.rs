use async_trait::async_trait;
use log::info;
use std::io::ErrorKind;
use tokio::fs;

use super::FileStore;
use crate::storage::{BlobStore, StoreError};

#[async_trait]
impl BlobStore for FileStore {
    async fn upload_blob(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StoreError> {
        let file_path = self.connection.blob_path(path)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = file_path.with_extension("tmp");
        fs::write(&temp_path, &bytes).await?;
        fs::rename(&temp_path, &file_path).await?;

        info!("Uploaded {} ({} bytes, {})", path, bytes.len(), content_type);
        Ok(self.connection.blob_url(&file_path))
    }

    async fn download_blob(&self, path: &str, max_size: u64) -> Result<Vec<u8>, StoreError> {
        let file_path = self.connection.blob_path(path)?;

        let metadata = match fs::metadata(&file_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::BlobNotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.len() > max_size {
            return Err(StoreError::BlobTooLarge {
                path: path.to_string(),
                size: metadata.len(),
                limit: max_size,
            });
        }

        Ok(fs::read(&file_path).await?)
    }
}
