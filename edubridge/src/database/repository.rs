//! Repository layer for document operations
//!
//! SQLite-backed `DocumentStore`. Every collection lives in one
//! `documents` table keyed by `(collection, id)`; fields are stored as a
//! JSON object and timestamps as integer microseconds so ordering is exact.

use super::models::{Document, Fields};
use super::store::{DocumentStore, MergeCheck};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::fmt::Display;
use uuid::Uuid;

/// Repository for document operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    fields_json: String,
    created_at: i64,
    updated_at: i64,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn read_error(collection: &str, e: impl Display) -> AppError {
    AppError::StoreRead(format!("{}: {}", collection, e))
}

fn write_error(collection: &str, e: impl Display) -> AppError {
    AppError::StoreWrite(format!("{}: {}", collection, e))
}

fn decode_timestamp(micros: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_micros(micros).single()
}

fn decode_fields(json: &str) -> std::result::Result<Fields, serde_json::Error> {
    serde_json::from_str(json)
}

impl DocumentRow {
    fn into_document(self, collection: &str) -> Result<Document> {
        let fields = decode_fields(&self.fields_json)
            .map_err(|e| read_error(collection, format!("document {}: {}", self.id, e)))?;

        let created_at = decode_timestamp(self.created_at).ok_or_else(|| {
            read_error(collection, format!("document {}: invalid createdAt", self.id))
        })?;
        let updated_at = decode_timestamp(self.updated_at).ok_or_else(|| {
            read_error(collection, format!("document {}: invalid updatedAt", self.id))
        })?;

        Ok(Document {
            id: self.id,
            fields,
            created_at,
            updated_at,
        })
    }
}

async fn merge_locked(
    conn: &mut SqliteConnection,
    collection: &str,
    id: &str,
    fields: Fields,
    at: DateTime<Utc>,
    check: &MergeCheck<'_>,
) -> Result<()> {
    let current: Option<String> =
        sqlx::query_scalar("SELECT fields_json FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| write_error(collection, e))?;

    let current = current.ok_or_else(|| write_error(collection, format!("no document {}", id)))?;

    let mut merged = decode_fields(&current).map_err(|e| write_error(collection, e))?;
    merged.extend(fields);
    check(&merged)?;

    let merged_json = serde_json::to_string(&merged).map_err(|e| write_error(collection, e))?;

    sqlx::query(
        r#"
        UPDATE documents SET fields_json = ?, updated_at = ?
        WHERE collection = ? AND id = ?
        "#,
    )
    .bind(&merged_json)
    .bind(at.timestamp_micros())
    .bind(collection)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| write_error(collection, e))?;

    Ok(())
}

async fn rollback(conn: &mut SqliteConnection, collection: &str) {
    if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
        tracing::warn!("Failed to roll back merge in {}: {}", collection, e);
    }
}

#[async_trait]
impl DocumentStore for Repository {
    async fn insert(&self, collection: &str, fields: Fields, at: DateTime<Utc>) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let fields_json =
            serde_json::to_string(&fields).map_err(|e| write_error(collection, e))?;
        let micros = at.timestamp_micros();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, fields_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(&fields_json)
        .bind(micros)
        .bind(micros)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(collection, e))?;

        tracing::debug!("Inserted document {}/{}", collection, id);
        Ok(id)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, fields_json, created_at, updated_at FROM documents
            WHERE collection = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error(collection, e))?;

        rows.into_iter()
            .map(|row| row.into_document(collection))
            .collect()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, fields_json, created_at, updated_at FROM documents
            WHERE collection = ? AND id = ?
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error(collection, e))?;

        row.map(|row| row.into_document(collection)).transpose()
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        at: DateTime<Utc>,
        check: &MergeCheck<'_>,
    ) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| write_error(collection, e))?;

        // Take the write lock up front so the busy timeout covers contention
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| write_error(collection, e))?;

        let merged = merge_locked(&mut conn, collection, id, fields, at, check).await;

        match merged {
            Ok(()) => {
                if let Err(e) = sqlx::query("COMMIT").execute(&mut *conn).await {
                    rollback(&mut conn, collection).await;
                    return Err(write_error(collection, e));
                }
            }
            Err(e) => {
                rollback(&mut conn, collection).await;
                return Err(e);
            }
        }

        tracing::debug!("Merged document {}/{}", collection, id);
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(collection, e))?
            .rows_affected();

        tracing::debug!("Removed document {}/{} ({} rows)", collection, id, rows);
        Ok(())
    }
}
