//! Bucketed object storage on the local filesystem.
//!
//! Object bytes live at `<root>/<bucket>/<path>`; content type and cache
//! directive are recorded in the `objects` table and replayed when the object
//! is served under `/storage/<bucket>/<path>`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StoredObject;
use crate::repo::object::ObjectRepository;

/// Cache directive for uploaded card images.
pub const CACHE_CONTROL: &str = "max-age=3600";

/// URL prefix the blob store is mounted under.
pub const PUBLIC_PREFIX: &str = "/storage";

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub content_type: String,
    pub cache_control: String,
    /// Replace an existing object instead of failing.
    pub upsert: bool,
}

#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
    objects: ObjectRepository,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str, objects: ObjectRepository) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            objects,
        }
    }

    /// Writes the object and records its metadata. Nothing is left on disk
    /// when either step fails.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        options: &UploadOptions,
    ) -> Result<StoredObject> {
        let file_path = self.object_path(bucket, path)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(upload_error)?;
        }

        let mut open = fs::OpenOptions::new();
        open.write(true);
        if options.upsert {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }

        let mut file = open.open(&file_path).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => AppError::Upload("The resource already exists".to_string()),
            _ => upload_error(e),
        })?;

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        drop(file);
        if let Err(e) = written {
            discard_partial(&file_path).await;
            return Err(upload_error(e));
        }

        let recorded = self
            .objects
            .put(
                bucket,
                path,
                &options.content_type,
                &options.cache_control,
                bytes.len() as i64,
                options.upsert,
            )
            .await;

        match recorded {
            Ok(object) => {
                tracing::debug!(
                    bucket,
                    path,
                    content_type = %object.content_type,
                    size = object.size,
                    "Stored object"
                );
                Ok(object)
            }
            Err(e) => {
                discard_partial(&file_path).await;
                Err(e)
            }
        }
    }

    /// Metadata and bytes of a stored object.
    pub async fn download(&self, bucket: &str, path: &str) -> Result<(StoredObject, Vec<u8>)> {
        let file_path = self.object_path(bucket, path)?;
        let object = self
            .objects
            .find(bucket, path)
            .await?
            .ok_or(AppError::NotFound)?;

        let bytes = fs::read(&file_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound,
            _ => AppError::Internal(format!("Failed to read {}/{}: {}", bucket, path, e)),
        })?;

        Ok((object, bytes))
    }

    pub async fn remove(&self, bucket: &str, path: &str) -> Result<()> {
        let file_path = self.object_path(bucket, path)?;
        self.objects.delete(bucket, path).await?;
        fs::remove_file(&file_path).await.map_err(upload_error)
    }

    pub fn get_public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}{}/{}/{}", self.public_base_url, PUBLIC_PREFIX, bucket, path)
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        let relative = Path::new(bucket).join(path);
        let well_formed = !bucket.is_empty()
            && !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !well_formed {
            return Err(AppError::BadRequest(format!("Invalid object path: {}/{}", bucket, path)));
        }

        Ok(self.root.join(relative))
    }
}

async fn discard_partial(file_path: &Path) {
    if let Err(e) = fs::remove_file(file_path).await {
        tracing::warn!(path = %file_path.display(), error = %e, "Failed to remove partial object");
    }
}

fn upload_error(e: std::io::Error) -> AppError {
    AppError::Upload(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;
    use std::sync::Arc;

    fn options() -> UploadOptions {
        UploadOptions {
            content_type: "image/png".to_string(),
            cache_control: CACHE_CONTROL.to_string(),
            upsert: false,
        }
    }

    async fn store_at(root: &Path) -> (LocalBlobStore, Arc<SqlitePool>) {
        let pool = Arc::new(crate::test_utils::create_test_pool().await);
        let store = LocalBlobStore::new(
            root,
            "http://localhost:3000",
            ObjectRepository::new(pool.clone()),
        );
        (store, pool)
    }

    #[tokio::test]
    async fn test_upload_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _pool) = store_at(dir.path()).await;

        store.upload("bucket", "a/b.png", b"one", &options()).await.unwrap();
        let second = store.upload("bucket", "a/b.png", b"two", &options()).await;

        assert!(matches!(second, Err(AppError::Upload(_))));
        let stored = std::fs::read(dir.path().join("bucket/a/b.png")).unwrap();
        assert_eq!(stored, b"one");
    }

    #[tokio::test]
    async fn test_upsert_replaces_object() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _pool) = store_at(dir.path()).await;
        let upsert = UploadOptions {
            upsert: true,
            ..options()
        };

        store.upload("bucket", "x.png", b"one", &upsert).await.unwrap();
        let jpeg = UploadOptions {
            content_type: "image/jpeg".to_string(),
            ..upsert
        };
        store.upload("bucket", "x.png", b"two", &jpeg).await.unwrap();

        let (object, bytes) = store.download("bucket", "x.png").await.unwrap();
        assert_eq!(bytes, b"two");
        assert_eq!(object.content_type, "image/jpeg");
        assert_eq!(object.size, 3);
    }

    #[tokio::test]
    async fn test_download_keeps_declared_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _pool) = store_at(dir.path()).await;
        let webp = UploadOptions {
            content_type: "image/webp".to_string(),
            ..options()
        };

        store.upload("bucket", "pic.png", b"RIFF", &webp).await.unwrap();

        let (object, bytes) = store.download("bucket", "pic.png").await.unwrap();
        assert_eq!(object.content_type, "image/webp");
        assert_eq!(object.cache_control, "max-age=3600");
        assert_eq!(bytes, b"RIFF");
    }

    #[tokio::test]
    async fn test_failed_metadata_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let (store, pool) = store_at(dir.path()).await;
        sqlx::query("DROP TABLE objects")
            .execute(pool.as_ref())
            .await
            .unwrap();

        let result = store.upload("bucket", "gone.png", b"bytes", &options()).await;

        assert!(result.is_err());
        assert!(!dir.path().join("bucket/gone.png").exists());
    }

    #[tokio::test]
    async fn test_remove_forgets_object() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _pool) = store_at(dir.path()).await;

        store.upload("bucket", "tmp.png", b"x", &options()).await.unwrap();
        store.remove("bucket", "tmp.png").await.unwrap();

        assert!(matches!(
            store.download("bucket", "tmp.png").await,
            Err(AppError::NotFound)
        ));
        assert!(!dir.path().join("bucket/tmp.png").exists());
    }

    #[tokio::test]
    async fn test_rejects_paths_escaping_the_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _pool) = store_at(dir.path()).await;

        let result = store.upload("bucket", "../evil.png", b"x", &options()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_public_url() {
        let pool = Arc::new(crate::test_utils::create_test_pool().await);
        let store = LocalBlobStore::new(
            "/tmp/unused",
            "https://cdn.example.com/",
            ObjectRepository::new(pool),
        );
        assert_eq!(
            store.get_public_url("card-images", "b/1-ff.png"),
            "https://cdn.example.com/storage/card-images/b/1-ff.png"
        );
    }
}
