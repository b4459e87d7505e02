use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::errors::StorageError;

/// Database row of the `documents` table.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentDB {
    pub collection: String,
    pub doc_id: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A decoded document with its server-assigned timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub collection: String,
    pub id: String,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StorageError> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

impl TryFrom<DocumentDB> for StoredDocument {
    type Error = StorageError;

    fn try_from(row: DocumentDB) -> Result<Self, Self::Error> {
        Ok(StoredDocument {
            body: serde_json::from_str(&row.body)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            collection: row.collection,
            id: row.doc_id,
        })
    }
}
