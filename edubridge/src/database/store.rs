//! Document store abstraction
//!
//! Schemaless documents grouped in named collections. Timestamps are
//! supplied by the caller; the store only persists them.

use super::models::{Document, Fields};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Validation run on a merged document inside the write
pub type MergeCheck<'a> = dyn Fn(&Fields) -> Result<()> + Send + Sync + 'a;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document with `createdAt = updatedAt = at`, returning its generated id
    async fn insert(&self, collection: &str, fields: Fields, at: DateTime<Utc>) -> Result<String>;

    /// Every document in the collection, newest `createdAt` first
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Merge top-level `fields` into an existing document and set `updatedAt = at`.
    ///
    /// `check` sees the merged fields before anything is written; an error
    /// from it aborts the merge. Fails with `StoreWrite` if the document
    /// does not exist.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        at: DateTime<Utc>,
        check: &MergeCheck<'_>,
    ) -> Result<()>;

    /// Permanently remove a document; removing a missing id is not an error
    async fn remove(&self, collection: &str, id: &str) -> Result<()>;
}
