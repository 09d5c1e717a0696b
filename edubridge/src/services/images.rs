//! Image asset service
//!
//! Uploads images under collision-resistant keys
//! (`<folder>/<unix millis>_<file name>`) and deletes them by URL.
//! No content-type or size validation happens here.

use crate::config::MAX_FILENAME_LENGTH;
use crate::error::Result;
use crate::storage::BlobStore;
use chrono::Utc;
use std::sync::Arc;

/// Service for uploading and deleting images
#[derive(Clone)]
pub struct ImageService {
    blob_store: Arc<dyn BlobStore>,
}

impl ImageService {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }

    /// Upload an image into `folder`, returning its public URL
    pub async fn upload_image(&self, data: &[u8], file_name: &str, folder: &str) -> Result<String> {
        let prefix = format!("{}_", Utc::now().timestamp_millis());
        let name = sanitize_filename(file_name, MAX_FILENAME_LENGTH.saturating_sub(prefix.len()));
        let key = format!("{}/{}{}", folder, prefix, name);

        tracing::info!("Uploading image: {} ({} bytes)", key, data.len());

        let url = self.blob_store.put(&key, data).await?;

        tracing::info!("Image uploaded: {}", url);
        Ok(url)
    }

    /// Delete an image by URL.
    ///
    /// URLs the blob store does not recognize as its own are ignored.
    pub async fn delete_image(&self, url: &str) -> Result<()> {
        let Some(key) = self.blob_store.key_for_url(url) else {
            tracing::debug!("Not a store-owned image URL, skipping delete: {}", url);
            return Ok(());
        };

        self.blob_store.delete(&key).await?;

        tracing::info!("Image deleted: {}", key);
        Ok(())
    }

    /// Upload a new image, then try to delete the one it replaces.
    ///
    /// Failing to delete the old image is logged, not returned.
    pub async fn replace_image(
        &self,
        old_url: Option<&str>,
        data: &[u8],
        file_name: &str,
        folder: &str,
    ) -> Result<String> {
        let url = self.upload_image(data, file_name, folder).await?;

        if let Some(old_url) = old_url {
            self.discard_image(old_url).await;
        }

        Ok(url)
    }

    /// Best-effort delete
    pub async fn discard_image(&self, url: &str) {
        if let Err(e) = self.delete_image(url).await {
            tracing::warn!("Failed to delete image {}: {}", url, e);
        }
    }
}

/// Sanitize a file name for use in the last segment of a blob key,
/// cut to at most `max_bytes` on a char boundary
fn sanitize_filename(filename: &str, max_bytes: usize) -> String {
    let mut sanitized = String::new();
    let chars = filename
        .chars()
        .filter(|c| *c != '/' && *c != '\\' && *c != '\0')
        .map(|c| if c.is_whitespace() { '_' } else { c });

    for c in chars {
        if sanitized.len() + c.len_utf8() > max_bytes {
            break;
        }
        sanitized.push(c);
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::LocalBlobStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const BASE_URL: &str = "https://media.edubridge.test/o";

    async fn create_test_service() -> (ImageService, LocalBlobStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(temp_dir.path().join("blobs"), BASE_URL);
        store.initialize().await.unwrap();
        (ImageService::new(Arc::new(store.clone())), store, temp_dir)
    }

    /// Records every call and optionally fails deletes
    #[derive(Default)]
    struct RecordingBlobStore {
        deletes: Mutex<Vec<String>>,
        fail_deletes: bool,
    }

    #[async_trait]
    impl BlobStore for RecordingBlobStore {
        async fn put(&self, key: &str, _data: &[u8]) -> Result<String> {
            Ok(format!("{}/{}", BASE_URL, key))
        }

        async fn read(&self, key: &str) -> Result<Vec<u8>> {
            Err(AppError::Generic(format!("not stored: {}", key)))
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.deletes.lock().unwrap().push(key.to_string());
            if self.fail_deletes {
                return Err(AppError::BlobDelete(format!("{}: permission denied", key)));
            }
            Ok(())
        }

        fn key_for_url(&self, url: &str) -> Option<String> {
            url.strip_prefix(BASE_URL)?
                .strip_prefix('/')
                .map(str::to_string)
        }
    }

    #[test]
    fn test_sanitize_filename() {
        let max = MAX_FILENAME_LENGTH;
        assert_eq!(sanitize_filename("normal.png", max), "normal.png");
        assert_eq!(sanitize_filename("../../../etc/passwd", max), "......etcpasswd");
        assert_eq!(sanitize_filename("file\\name.png", max), "filename.png");
        assert_eq!(sanitize_filename("campus photo.jpg", max), "campus_photo.jpg");
        assert_eq!(sanitize_filename(&"a".repeat(300), max).len(), max);
    }

    #[test]
    fn test_sanitize_cuts_on_char_boundary() {
        // Two bytes per char
        let cut = sanitize_filename(&"é".repeat(10), 7);
        assert_eq!(cut, "ééé");
        assert_eq!(sanitize_filename("école.png", 0), "");
    }

    fn last_segment(url: &str) -> &str {
        url.rsplit('/').next().unwrap()
    }

    #[tokio::test]
    async fn test_upload_long_file_names() {
        let (service, store, _temp) = create_test_service().await;

        let ascii = format!("{}.png", "a".repeat(246));
        let url = service.upload_image(b"x", &ascii, "blogs").await.unwrap();
        let key = store.key_for_url(&url).unwrap();
        assert!(last_segment(&key).len() <= MAX_FILENAME_LENGTH);
        assert_eq!(store.read(&key).await.unwrap(), b"x");

        let accented = format!("{}.png", "é".repeat(200));
        let url = service.upload_image(b"y", &accented, "blogs").await.unwrap();
        let key = store.key_for_url(&url).unwrap();
        assert!(last_segment(&key).len() <= MAX_FILENAME_LENGTH);
        assert_eq!(store.read(&key).await.unwrap(), b"y");
    }

    #[tokio::test]
    async fn test_upload_key_format() {
        let (service, store, _temp) = create_test_service().await;

        let url = service
            .upload_image(b"image bytes", "cover.png", "blogs")
            .await
            .unwrap();

        let rest = url
            .strip_prefix(&format!("{}/blogs/", BASE_URL))
            .expect("URL should contain the folder");
        let (timestamp, name) = rest.split_once('_').unwrap();
        assert!(!timestamp.is_empty());
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(name, "cover.png");

        let key = store.key_for_url(&url).unwrap();
        assert_eq!(store.read(&key).await.unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn test_delete_image() {
        let (service, store, _temp) = create_test_service().await;

        let url = service
            .upload_image(b"logo", "logo.png", "institutions")
            .await
            .unwrap();
        let key = store.key_for_url(&url).unwrap();

        service.delete_image(&url).await.unwrap();

        assert!(store.read(&key).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_foreign_url_is_noop() {
        let store = Arc::new(RecordingBlobStore::default());
        let service = ImageService::new(store.clone());

        service
            .delete_image("https://images.unsplash.com/photo-123.jpg")
            .await
            .unwrap();
        service.delete_image("").await.unwrap();

        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported() {
        let store = Arc::new(RecordingBlobStore {
            fail_deletes: true,
            ..RecordingBlobStore::default()
        });
        let service = ImageService::new(store.clone());

        let result = service
            .delete_image(&format!("{}/blogs/1_a.png", BASE_URL))
            .await;

        assert!(matches!(result, Err(AppError::BlobDelete(_))));
        assert_eq!(*store.deletes.lock().unwrap(), vec!["blogs/1_a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_replace_image_tolerates_delete_failure() {
        let store = Arc::new(RecordingBlobStore {
            fail_deletes: true,
            ..RecordingBlobStore::default()
        });
        let service = ImageService::new(store.clone());

        let old_url = format!("{}/resources/1_old.png", BASE_URL);
        let new_url = service
            .replace_image(Some(&old_url), b"new", "new.png", "resources")
            .await
            .unwrap();

        assert!(new_url.starts_with(&format!("{}/resources/", BASE_URL)));
        assert!(new_url.ends_with("_new.png"));
        assert_eq!(*store.deletes.lock().unwrap(), vec!["resources/1_old.png".to_string()]);
    }
}
