//! Management screen controller
//!
//! Backs one admin management screen: loads the whole collection, filters
//! it in memory, and re-fetches everything after each mutation instead of
//! patching the local list. Failures are logged and returned; the loaded
//! list is left as it was.

use crate::database::{Entity, Record, WithImage};
use crate::error::Result;
use crate::services::search::{filter_records, Searchable};
use crate::services::{EntityAccess, ImageService};

/// A file picked in an admin form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

pub struct Management<T> {
    access: EntityAccess<T>,
    images: ImageService,
    items: Vec<Record<T>>,
    loading: bool,
}

impl<T: Entity> Management<T> {
    pub fn new(access: EntityAccess<T>, images: ImageService) -> Self {
        Self {
            access,
            images,
            items: Vec::new(),
            loading: true,
        }
    }

    pub fn items(&self) -> &[Record<T>] {
        &self.items
    }

    /// True until the first fetch completes, successfully or not
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Re-fetch the whole collection
    pub async fn refresh(&mut self) -> Result<()> {
        let result = self.access.get_all().await;
        self.loading = false;

        match result {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error fetching {}: {}", T::COLLECTION, e);
                Err(e)
            }
        }
    }

    /// Create a record, or update the one being edited, then re-fetch
    pub async fn save(&mut self, editing: Option<&str>, fields: T) -> Result<String> {
        let id = self.write(editing, &fields).await?;
        self.refresh_after_mutation().await;
        Ok(id)
    }

    /// Delete a record once the user has confirmed, then re-fetch.
    ///
    /// Returns whether anything was deleted.
    pub async fn remove(&mut self, id: &str, confirmed: bool) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }

        if let Err(e) = self.access.delete(id).await {
            tracing::error!("Error deleting {} record {}: {}", T::COLLECTION, id, e);
            return Err(e);
        }

        self.refresh_after_mutation().await;
        Ok(true)
    }

    async fn write(&self, editing: Option<&str>, fields: &T) -> Result<String> {
        let result = match editing {
            Some(id) => self
                .access
                .update_record(id, fields)
                .await
                .map(|_| id.to_string()),
            None => self.access.create(fields).await,
        };

        if let Err(e) = &result {
            tracing::error!("Error saving {} record: {}", T::COLLECTION, e);
        }

        result
    }

    async fn refresh_after_mutation(&mut self) {
        // The mutation already succeeded; refresh() logs its own failure
        let _ = self.refresh().await;
    }
}

impl<T: WithImage> Management<T> {
    /// Save with an optional newly picked image.
    ///
    /// The image being replaced is read from the store, not the loaded
    /// list. The new image is uploaded before the record is written. Once the
    /// write succeeds the replaced image is deleted best-effort; if the
    /// write fails the fresh upload is discarded instead.
    pub async fn save_with_image(
        &mut self,
        editing: Option<&str>,
        mut fields: T,
        upload: Option<ImageUpload>,
    ) -> Result<String> {
        let previous = match editing {
            Some(id) => self
                .access
                .get(id)
                .await
                .map_err(|e| {
                    tracing::error!("Error loading {} record {}: {}", T::COLLECTION, id, e);
                    e
                })?
                .and_then(|record| record.fields.image_url().map(str::to_string)),
            None => None,
        };

        let uploaded = match upload {
            Some(upload) => {
                let url = self
                    .images
                    .upload_image(&upload.data, &upload.file_name, T::IMAGE_FOLDER)
                    .await
                    .map_err(|e| {
                        tracing::error!("Error uploading {} image: {}", T::COLLECTION, e);
                        e
                    })?;
                fields.set_image_url(Some(url.clone()));
                Some(url)
            }
            None => None,
        };

        let id = match self.write(editing, &fields).await {
            Ok(id) => id,
            Err(e) => {
                if let Some(url) = &uploaded {
                    self.images.discard_image(url).await;
                }
                return Err(e);
            }
        };

        if let (Some(previous), Some(uploaded)) = (&previous, &uploaded) {
            if previous != uploaded {
                self.images.discard_image(previous).await;
            }
        }

        self.refresh_after_mutation().await;
        Ok(id)
    }
}

impl<T: Entity + Searchable> Management<T> {
    /// Loaded records matching `term`
    pub fn search(&self, term: &str) -> Vec<&Record<T>> {
        filter_records(&self.items, term)
    }
}
