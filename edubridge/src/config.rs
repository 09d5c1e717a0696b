//! Application configuration
//!
//! Central location for collection names, blob folders and limits used
//! throughout the access layer, plus the JSON-backed runtime configuration.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

// ===== Collections =====

pub const STUDENTS_COLLECTION: &str = "students";
pub const INSTITUTIONS_COLLECTION: &str = "institutions";
pub const RESOURCES_COLLECTION: &str = "resources";
pub const BLOGS_COLLECTION: &str = "blogs";
pub const PARTNERS_COLLECTION: &str = "partners";
pub const ADMINS_COLLECTION: &str = "admins";

// ===== Blob Folders =====

pub const BLOGS_FOLDER: &str = "blogs";
pub const INSTITUTIONS_FOLDER: &str = "institutions";
pub const RESOURCES_FOLDER: &str = "resources";
pub const PARTNERS_FOLDER: &str = "partners";

/// Maximum length in bytes of the last segment of a blob key,
/// timestamp prefix included
pub const MAX_FILENAME_LENGTH: usize = 255;

// ===== Admin Accounts =====

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@edubridge.com";
pub const DEFAULT_ADMIN_NAME: &str = "System Administrator";
pub const ADMIN_ROLE: &str = "admin";

// ===== Runtime Configuration =====

/// Credentials for the bootstrap administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeed {
    #[serde(default = "default_admin_email")]
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
}

fn default_admin_email() -> String {
    DEFAULT_ADMIN_EMAIL.to_string()
}

fn default_admin_name() -> String {
    DEFAULT_ADMIN_NAME.to_string()
}

/// Runtime configuration loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Prefix of every public image URL handed out by the blob store
    #[serde(default = "default_blob_public_base_url")]
    pub blob_public_base_url: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Seeded at startup when present
    #[serde(default)]
    pub default_admin: Option<AdminSeed>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_blob_public_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

fn default_log_filter() -> String {
    "edubridge=debug,info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            blob_public_base_url: default_blob_public_base_url(),
            log_filter: default_log_filter(),
            default_admin: None,
        }
    }
}

impl AppConfig {
    /// Load config from disk or create the default file if it does not exist
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file {:?} not found, writing defaults", path);
            let default = AppConfig::default();
            default.save(path).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(path).await?;
        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Save config to disk
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(path, content).await?;
        tracing::info!("Config saved to {:?}", path);

        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("edubridge.db")
    }

    pub fn blob_root(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_config_written_on_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("edubridge.json");

        let config = AppConfig::load(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.log_filter, "edubridge=debug,info");
        assert!(config.default_admin.is_none());
    }

    #[tokio::test]
    async fn test_partial_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("edubridge.json");
        fs::write(
            &path,
            r#"{"blob_public_base_url":"https://cdn.example.org/media","default_admin":{"password":"s3cret"}}"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load(&path).await.unwrap();

        assert_eq!(config.blob_public_base_url, "https://cdn.example.org/media");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        let seed = config.default_admin.unwrap();
        assert_eq!(seed.email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(seed.name, DEFAULT_ADMIN_NAME);
        assert_eq!(seed.password, "s3cret");
    }

    #[tokio::test]
    async fn test_malformed_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("edubridge.json");
        fs::write(&path, "{ not json").await.unwrap();

        let result = AppConfig::load(&path).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_derived_paths() {
        let config = AppConfig {
            data_dir: PathBuf::from("/srv/edubridge"),
            ..AppConfig::default()
        };

        assert_eq!(config.database_path(), PathBuf::from("/srv/edubridge/edubridge.db"));
        assert_eq!(config.blob_root(), PathBuf::from("/srv/edubridge/blobs"));
    }
}
