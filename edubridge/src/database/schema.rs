//! Document table schema
//!
//! Versioned SQL scripts applied in order. Each applied version is recorded
//! in `migrations`, so reopening an existing database only runs new scripts.
//! Journal mode and busy timeout are connection options, set in `create_pool`.

use crate::error::Result;
use sqlx::sqlite::SqlitePool;

/// `(version, script)` pairs in ascending version order
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("migrations/001_initial_schema.sql"))];

/// Bring the schema up to the latest version
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?;

    let pending: Vec<_> = MIGRATIONS
        .iter()
        .filter(|(version, _)| *version > applied)
        .collect();

    if pending.is_empty() {
        tracing::debug!("Document schema up to date at version {}", applied);
        return Ok(());
    }

    for (version, script) in pending {
        apply_migration(pool, *version, script).await?;
    }

    Ok(())
}

/// Run one script and record its version in a single transaction
async fn apply_migration(pool: &SqlitePool, version: i64, script: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    let statements = script.split(';').map(str::trim).filter(|s| !s.is_empty());
    for statement in statements {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    sqlx::query("INSERT INTO migrations (version) VALUES (?)")
        .bind(version)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Applied document schema version {}", version);
    Ok(())
}
