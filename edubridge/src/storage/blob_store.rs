//! Image blob storage
//!
//! Binary objects are addressed by a slash-separated key
//! (e.g. "blogs/1718000000000_cover.png") and served from a public URL
//! formed by appending the key to the store's base URL.
//!
//! `LocalBlobStore` keeps objects on disk under a root directory; the same
//! key maps to `<root>/blogs/1718000000000_cover.png`. Key segments are
//! percent-encoded in URLs.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Everything but RFC 3986 unreserved characters is escaped in URL segments
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` under `key`, returning its public URL
    async fn put(&self, key: &str, data: &[u8]) -> Result<String>;

    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the object at `key`; deleting an absent object succeeds
    async fn delete(&self, key: &str) -> Result<()>;

    /// Resolve a public URL back to its key if it looks like one of ours.
    ///
    /// Pattern match only: the object is not checked for existence.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// Filesystem-backed blob store
#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    /// Create a new blob store at the given root directory
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            root,
            public_base_url,
        }
    }

    /// Initialize the blob store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Blob store initialized at: {:?}", self.root);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    fn url_for_key(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
            .collect();
        format!("{}/{}", self.public_base_url, encoded.join("/"))
    }

    /// Map a key to its file path, rejecting keys that would escape the root
    fn get_path(&self, key: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<String> {
        let path = self
            .get_path(key)
            .ok_or_else(|| AppError::BlobWrite(format!("Invalid blob key: {}", key)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::BlobWrite(format!("{}: {}", key, e)))?;
        }

        // Write to a uniquely named temp file first, then rename into place
        let temp_path = path.with_file_name(format!(".{}.tmp", Uuid::new_v4()));
        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        };
        write
            .await
            .map_err(|e| AppError::BlobWrite(format!("{}: {}", key, e)))?;

        tracing::debug!("Wrote blob: {} ({} bytes)", key, data.len());

        Ok(self.url_for_key(key))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self
            .get_path(key)
            .ok_or_else(|| AppError::Generic(format!("Invalid blob key: {}", key)))?;

        let data = fs::read(&path).await?;

        tracing::debug!("Read blob: {} ({} bytes)", key, data.len());

        Ok(data)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self
            .get_path(key)
            .ok_or_else(|| AppError::BlobDelete(format!("Invalid blob key: {}", key)))?;

        if !path.exists() {
            return Ok(()); // Already deleted
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| AppError::BlobDelete(format!("{}: {}", key, e)))?;

        tracing::debug!("Deleted blob: {}", key);

        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        let encoded = url
            .strip_prefix(self.public_base_url.as_str())?
            .strip_prefix('/')?;

        let segments = encoded
            .split('/')
            .map(|segment| {
                let decoded = percent_decode_str(segment).decode_utf8().ok()?;
                (!decoded.contains('/')).then(|| decoded.into_owned())
            })
            .collect::<Option<Vec<String>>>()?;
        let key = segments.join("/");

        self.get_path(&key).map(|_| key)
    }
}
