//! Entity access layer
//!
//! One generic create/get_all/update/delete implementation, instantiated
//! per entity kind. Timestamps are assigned here, not by the store:
//! `createdAt = updatedAt` on create, `updatedAt` bumped on every update.
//! There is no version check, so concurrent updates are last-write-wins.

use crate::database::{
    AdminAccount, Blog, Document, DocumentStore, Entity, Fields, Institution, Partner, Record,
    Resource, Student, RESERVED_KEYS,
};
use crate::error::{AppError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

static LAST_TIMESTAMP_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current time in microseconds, strictly increasing across calls in this process
fn next_timestamp() -> DateTime<Utc> {
    let now = Utc::now().timestamp_micros();
    let previous = LAST_TIMESTAMP_MICROS
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    let next = now.max(previous + 1);

    Utc.timestamp_micros(next).single().unwrap_or_else(Utc::now)
}

/// Serialize a typed value into a top-level field map
fn to_fields<V: Serialize>(value: &V, collection: &str) -> Result<Fields> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(AppError::StoreWrite(format!(
            "{}: fields must be a map, got {}",
            collection, other
        ))),
        Err(e) => Err(AppError::StoreWrite(format!("{}: {}", collection, e))),
    }
}

fn decode_record<T: Entity>(doc: Document) -> Result<Record<T>> {
    let fields = serde_json::from_value(serde_json::Value::Object(doc.fields)).map_err(|e| {
        AppError::StoreRead(format!("{}: document {}: {}", T::COLLECTION, doc.id, e))
    })?;

    Ok(Record {
        id: doc.id,
        fields,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}

/// Typed access to one collection
pub struct EntityAccess<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityAccess<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> EntityAccess<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        T::COLLECTION
    }

    /// Persist a new record, returning its store-generated id
    pub async fn create(&self, fields: &T) -> Result<String> {
        let fields = to_fields(fields, T::COLLECTION)?;
        let at = next_timestamp();

        let id = self.store.insert(T::COLLECTION, fields, at).await?;

        tracing::info!("Created {} record: {}", T::COLLECTION, id);
        Ok(id)
    }

    /// Every record in the collection, newest first
    pub async fn get_all(&self) -> Result<Vec<Record<T>>> {
        let docs = self.store.list(T::COLLECTION).await?;
        docs.into_iter().map(decode_record).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Record<T>>> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(decode_record)
            .transpose()
    }

    /// Merge the fields set in `patch` into an existing record
    pub async fn update(&self, id: &str, patch: &T::Patch) -> Result<()> {
        let fields = to_fields(patch, T::COLLECTION)?;
        self.update_fields(id, fields).await
    }

    /// Merge every schema field of `fields` into an existing record
    pub async fn update_record(&self, id: &str, fields: &T) -> Result<()> {
        let fields = to_fields(fields, T::COLLECTION)?;
        self.update_fields(id, fields).await
    }

    /// Merge a raw field map into an existing record.
    ///
    /// `id`, `createdAt` and `updatedAt` in the input are ignored. A merge
    /// whose result no longer decodes as `T` fails with `StoreWrite` and
    /// leaves the record untouched.
    pub async fn update_fields(&self, id: &str, mut fields: Fields) -> Result<()> {
        for key in RESERVED_KEYS {
            fields.remove(*key);
        }
        let at = next_timestamp();

        let check = |merged: &Fields| -> Result<()> {
            serde_json::from_value::<T>(serde_json::Value::Object(merged.clone()))
                .map(|_| ())
                .map_err(|e| {
                    AppError::StoreWrite(format!("{}: document {}: {}", T::COLLECTION, id, e))
                })
        };
        self.store.merge(T::COLLECTION, id, fields, at, &check).await?;

        tracing::info!("Updated {} record: {}", T::COLLECTION, id);
        Ok(())
    }

    /// Permanently delete a record. Associated images are left in place.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.remove(T::COLLECTION, id).await?;

        tracing::info!("Deleted {} record: {}", T::COLLECTION, id);
        Ok(())
    }
}

/// Access to every managed entity kind over one document store
#[derive(Clone)]
pub struct Entities {
    pub students: EntityAccess<Student>,
    pub institutions: EntityAccess<Institution>,
    pub resources: EntityAccess<Resource>,
    pub blogs: EntityAccess<Blog>,
    pub partners: EntityAccess<Partner>,
    pub admins: EntityAccess<AdminAccount>,
}

impl Entities {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            students: EntityAccess::new(Arc::clone(&store)),
            institutions: EntityAccess::new(Arc::clone(&store)),
            resources: EntityAccess::new(Arc::clone(&store)),
            blogs: EntityAccess::new(Arc::clone(&store)),
            partners: EntityAccess::new(Arc::clone(&store)),
            admins: EntityAccess::new(store),
        }
    }
}
