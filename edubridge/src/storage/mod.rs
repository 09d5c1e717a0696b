//! Storage module
//!
//! Provides blob storage for uploaded images.

pub mod blob_store;

pub use blob_store::{BlobStore, LocalBlobStore};
