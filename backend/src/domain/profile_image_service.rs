//! Profile picture encoding and blob transfer.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use log::{debug, info};
use std::sync::Arc;

use super::errors::SyncError;
use super::models::ProfileImage;
use crate::storage::{BlobStore, StoreError};

#[derive(Clone)]
pub struct ProfileImageService {
    blobs: Arc<dyn BlobStore>,
    quality: u8,
    max_bytes: u64,
}

impl ProfileImageService {
    pub fn new(blobs: Arc<dyn BlobStore>, quality: u8, max_bytes: u64) -> Self {
        Self {
            blobs,
            quality: quality.clamp(1, 100),
            max_bytes,
        }
    }

    /// JPEG-encode a picture at the configured quality
    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, SyncError> {
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
        image.to_rgb8().write_with_encoder(encoder)?;
        debug!(
            "Encoded {}x{} profile image into {} bytes",
            image.width(),
            image.height(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Decode raw picture bytes (any supported format) and re-encode as JPEG
    pub fn encode_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, SyncError> {
        let image = image::load_from_memory(bytes)?;
        self.encode(&image)
    }

    /// Upload `jpeg` to the member's picture path and return its URL
    pub async fn upload(&self, user_name: &str, jpeg: Vec<u8>) -> Result<String, SyncError> {
        let path = shared::profile_image_path(user_name);
        info!("Uploading profile image for '{}' ({} bytes)", user_name, jpeg.len());

        let url = self
            .blobs
            .upload_blob(&path, jpeg, shared::JPEG_CONTENT_TYPE)
            .await?;
        Ok(url)
    }

    /// Store `from`'s picture under `to` as well, returning the new URL.
    ///
    /// `None` when `from` has no picture. The blob under `from` is left in place.
    pub async fn copy(&self, from: &str, to: &str) -> Result<Option<String>, SyncError> {
        let Some(image) = self.download(from).await? else {
            return Ok(None);
        };
        info!("Copying profile image of '{}' to '{}'", from, to);
        self.upload(to, image.bytes().to_vec()).await.map(Some)
    }

    /// Download the member's picture; `None` when none was ever uploaded
    pub async fn download(&self, user_name: &str) -> Result<Option<ProfileImage>, SyncError> {
        let path = shared::profile_image_path(user_name);
        match self.blobs.download_blob(&path, self.max_bytes).await {
            Ok(bytes) => Ok(Some(ProfileImage::from(bytes))),
            Err(StoreError::BlobNotFound(_)) => {
                debug!("No profile image stored for '{}'", user_name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
