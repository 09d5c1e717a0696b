//! Application state and initialization
//!
//! This module wires the document store, blob store and every service
//! together. All services are reachable through AppState.

use crate::config::AppConfig;
use crate::database::{create_pool, DocumentStore, Entity, Repository};
use crate::error::Result;
use crate::services::{
    AdminGate, AuthService, DashboardService, Entities, EntityAccess, ImageService, Management,
};
use crate::storage::{BlobStore, LocalBlobStore};
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub entities: Entities,
    pub images: ImageService,
    pub auth: AuthService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, blob_store: Arc<dyn BlobStore>) -> Self {
        let entities = Entities::new(store);

        Self {
            images: ImageService::new(blob_store),
            auth: AuthService::new(entities.admins.clone()),
            dashboard: DashboardService::new(entities.clone()),
            entities,
        }
    }

    /// Open the on-disk stores described by `config`
    pub async fn initialize(config: &AppConfig) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("Data directory: {:?}", config.data_dir);

        tokio::fs::create_dir_all(&config.data_dir).await?;

        let pool = create_pool(&config.database_path()).await?;

        let blob_store =
            LocalBlobStore::new(config.blob_root(), config.blob_public_base_url.clone());
        blob_store.initialize().await?;

        let state = Self::new(Arc::new(Repository::new(pool)), Arc::new(blob_store));

        tracing::info!("Application initialized successfully");
        Ok(state)
    }

    /// Controller for one management screen
    pub fn management<T: Entity>(&self, access: &EntityAccess<T>) -> Management<T> {
        Management::new(access.clone(), self.images.clone())
    }

    /// Gate following this application's auth state. Requires a Tokio runtime.
    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::start(self.auth.subscribe())
    }
}
