use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::storage::StoreError;

/// FileConnection resolves document and blob paths under one base directory
#[derive(Clone, Debug)]
pub struct FileConnection {
    base_directory: Arc<PathBuf>,
}

impl FileConnection {
    /// Open a connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: Arc::new(base_path),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the JSON file holding `collection/id`
    pub fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        let collection = Self::single_segment(collection)?;
        let id = Self::single_segment(id)?;
        Ok(self
            .base_directory
            .join(collection)
            .join(format!("{}.json", id)))
    }

    /// Path of the file holding the blob stored at `path`
    pub fn blob_path(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let is_plain = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.base_directory.join("blobs").join(relative))
    }

    fn single_segment(segment: &str) -> Result<&str, StoreError> {
        let invalid = segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['/', '\\']);

        if invalid {
            return Err(StoreError::InvalidPath(segment.to_string()));
        }
        Ok(segment)
    }

    /// URL handed back for an uploaded blob
    pub fn blob_url(&self, path: &Path) -> String {
        format!("file://{}", path.display())
    }
}
