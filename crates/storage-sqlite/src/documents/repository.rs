use chrono::{SubsecRound, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

use super::model::{format_timestamp, parse_timestamp, DocumentDB, StoredDocument};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::documents;
use pxl_core::errors::{DatabaseError, Result};

/// Keyed JSON document store over the `documents` table.
///
/// Reads use the pool; writes go through the writer actor so that the
/// check-then-write of `create_if_absent` and `update` is atomic.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DocumentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DocumentRepository { pool, writer }
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        let mut conn = get_connection(&self.pool)?;
        let row = find(&mut conn, collection, id).into_core()?;
        row.map(StoredDocument::try_from)
            .transpose()
            .map_err(Into::into)
    }

    /// Writes `body` under the key unless a document already exists there.
    ///
    /// Returns the stored document and whether this call created it. An
    /// existing document is returned untouched.
    pub async fn create_if_absent(
        &self,
        collection: &str,
        id: &str,
        body: Value,
    ) -> Result<(StoredDocument, bool)> {
        let collection = collection.to_string();
        let id = id.to_string();
        let body = serde_json::to_string(&body).into_core()?;

        self.writer
            .exec(move |conn| {
                let now = format_timestamp(Utc::now());
                let inserted = diesel::insert_into(documents::table)
                    .values(&DocumentDB {
                        collection: collection.clone(),
                        doc_id: id.clone(),
                        body,
                        created_at: now.clone(),
                        updated_at: now,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = find(conn, &collection, &id)
                    .map_err(StorageError::from)?
                    .ok_or_else(|| DatabaseError::NotFound(format!("{}/{}", collection, id)))?;
                debug!(
                    "create_if_absent {}/{}: {}",
                    collection,
                    id,
                    if inserted == 1 { "created" } else { "exists" }
                );
                Ok((StoredDocument::try_from(row)?, inserted == 1))
            })
            .await
    }

    /// Merges `patch` into the stored body and stamps `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<StoredDocument> {
        let collection = collection.to_string();
        let id = id.to_string();

        self.writer
            .exec(move |conn| {
                let row = find(conn, &collection, &id)
                    .map_err(StorageError::from)?
                    .ok_or_else(|| DatabaseError::NotFound(format!("{}/{}", collection, id)))?;

                let mut body: Value = serde_json::from_str(&row.body).map_err(StorageError::from)?;
                merge_patch(&mut body, &patch);

                let previous = parse_timestamp(&row.updated_at)?;
                // Stored with microsecond precision.
                let updated_at = Utc::now().trunc_subsecs(6).max(previous);
                let encoded = serde_json::to_string(&body).map_err(StorageError::from)?;

                diesel::update(
                    documents::table
                        .filter(documents::collection.eq(&collection))
                        .filter(documents::doc_id.eq(&id)),
                )
                .set((
                    documents::body.eq(&encoded),
                    documents::updated_at.eq(format_timestamp(updated_at)),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                Ok(StoredDocument {
                    collection,
                    id,
                    body,
                    created_at: parse_timestamp(&row.created_at)?,
                    updated_at,
                })
            })
            .await
    }
}

fn find(
    conn: &mut SqliteConnection,
    collection: &str,
    id: &str,
) -> QueryResult<Option<DocumentDB>> {
    documents::table
        .filter(documents::collection.eq(collection))
        .filter(documents::doc_id.eq(id))
        .select(DocumentDB::as_select())
        .first(conn)
        .optional()
}

/// Applies a JSON merge patch: objects merge key by key, `null` removes a
/// key, anything else replaces the target value.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_fields) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(fields) = target {
        for (key, value) in patch_fields {
            if value.is_null() {
                fields.remove(key);
            } else {
                merge_patch(fields.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
