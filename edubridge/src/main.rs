// EduBridge - admin back-office bootstrap
// Opens the stores, seeds the default admin and reports collection counts

use anyhow::Context;
use edubridge::app::AppState;
use edubridge::config::AppConfig;
use edubridge::services::DefaultAdmin;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("edubridge.json"));

    let config = AppConfig::load(&config_path)
        .await
        .with_context(|| format!("loading config from {:?}", config_path))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting EduBridge back-office");

    let state = AppState::initialize(&config)
        .await
        .context("initializing application state")?;

    if let Some(seed) = &config.default_admin {
        match state.auth.create_default_admin(seed).await? {
            DefaultAdmin::Created(identity) => {
                tracing::info!("Default admin created: {}", identity.email)
            }
            DefaultAdmin::AlreadyExists => tracing::info!("Default admin already present"),
        }
    }

    let stats = state.dashboard.fetch_stats().await?;
    tracing::info!(
        "Collections: {} students, {} institutions, {} resources, {} blogs, {} partners",
        stats.students,
        stats.institutions,
        stats.resources,
        stats.blogs,
        stats.partners
    );

    Ok(())
}
