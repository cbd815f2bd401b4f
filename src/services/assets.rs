use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

use crate::error::Result;
use crate::models::ImageFile;
use crate::storage::{LocalBlobStore, UploadOptions, CACHE_CONTROL};

const DEFAULT_EXTENSION: &str = "png";
const DEFAULT_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub path: String,
    pub public_url: String,
}

/// Stores card images in the image bucket.
#[derive(Clone)]
pub struct AssetUploader {
    store: LocalBlobStore,
    bucket: String,
}

impl AssetUploader {
    pub fn new(store: LocalBlobStore, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
        }
    }

    pub async fn upload(&self, board_id: Uuid, file: &ImageFile) -> Result<UploadedAsset> {
        let suffix = hex::encode(rand::random::<[u8; 8]>());
        let path = object_path(
            board_id,
            &file.file_name,
            Utc::now().timestamp_millis(),
            &suffix,
        );

        let content_type = file
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let options = UploadOptions {
            content_type,
            cache_control: CACHE_CONTROL.to_string(),
            upsert: false,
        };
        let object = self
            .store
            .upload(&self.bucket, &path, &file.bytes, &options)
            .await?;

        let public_url = self.store.get_public_url(&self.bucket, &path);
        tracing::info!(%board_id, path = %path, content_type = %object.content_type, "Uploaded card image");

        Ok(UploadedAsset { path, public_url })
    }

    /// Best-effort removal of an asset whose card was never created.
    pub async fn discard(&self, asset: &UploadedAsset) {
        if let Err(e) = self.store.remove(&self.bucket, &asset.path).await {
            tracing::warn!(path = %asset.path, error = %e, "Failed to discard orphaned asset");
        }
    }
}

/// `<board_id>/<epoch_millis>-<suffix>.<ext>`
pub fn object_path(board_id: Uuid, file_name: &str, epoch_millis: i64, suffix: &str) -> String {
    format!(
        "{}/{}-{}.{}",
        board_id,
        epoch_millis,
        suffix,
        file_extension(file_name)
    )
}

/// Lowercased extension of `file_name`, or `png` when it has none usable in a path.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(file_extension("Holiday.JPG"), "jpg");
        assert_eq!(file_extension("archive.tar.GZ"), "gz");
    }

    #[test]
    fn test_extension_defaults_to_png() {
        assert_eq!(file_extension("photo"), "png");
        assert_eq!(file_extension(""), "png");
        assert_eq!(file_extension("weird.p/g"), "png");
    }

    #[test]
    fn test_object_path_layout() {
        let board_id = Uuid::nil();
        assert_eq!(
            object_path(board_id, "cat.webp", 1700000000000, "a1b2"),
            "00000000-0000-0000-0000-000000000000/1700000000000-a1b2.webp"
        );
    }
}
