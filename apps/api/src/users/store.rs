//! Document store for user records, keyed by integer id.
//!
//! `AppState` holds an `Arc<dyn UserStore>`: `PgUserStore` when a database is
//! configured, `MemoryUserStore` otherwise (and in tests).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::user::UserDocument;

/// Keys that name the record itself and are never written as fields.
const KEY_FIELDS: [&str; 2] = ["id", "_id"];

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<UserDocument>, AppError>;

    /// Every stored record, in key order. Unbounded.
    async fn list(&self) -> Result<Vec<UserDocument>, AppError>;

    /// Stores `doc` unless its id is taken. Returns `false` on a taken id.
    async fn insert(&self, doc: UserDocument) -> Result<bool, AppError>;

    /// Sets each top-level field of `patch` on the record, leaving the rest alone.
    /// Returns `false` when no record has this id.
    async fn merge(&self, id: i64, patch: Map<String, Value>) -> Result<bool, AppError>;

    /// Returns `false` when no record has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Removes every record and returns how many were removed.
    async fn delete_all(&self) -> Result<u64, AppError>;
}

fn strip_key_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    for key in KEY_FIELDS {
        fields.remove(key);
    }
    fields
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL (JSONB documents)
// ────────────────────────────────────────────────────────────────────────────

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type DocumentRow = (i64, Json<Map<String, Value>>);

fn from_row((id, Json(fields)): DocumentRow) -> UserDocument {
    UserDocument { id, fields }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, id: i64) -> Result<Option<UserDocument>, AppError> {
        let row: Option<DocumentRow> =
            sqlx::query_as("SELECT id, doc FROM user_documents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(from_row))
    }

    async fn list(&self) -> Result<Vec<UserDocument>, AppError> {
        let rows: Vec<DocumentRow> =
            sqlx::query_as("SELECT id, doc FROM user_documents ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn insert(&self, doc: UserDocument) -> Result<bool, AppError> {
        let fields = strip_key_fields(doc.fields);
        let result = sqlx::query(
            "INSERT INTO user_documents (id, doc) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(doc.id)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn merge(&self, id: i64, patch: Map<String, Value>) -> Result<bool, AppError> {
        let patch = strip_key_fields(patch);
        // `||` on two JSONB objects replaces top-level keys present on the right.
        let result = sqlx::query("UPDATE user_documents SET doc = doc || $2 WHERE id = $1")
            .bind(id)
            .bind(Json(patch))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM user_documents")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryUserStore {
    records: RwLock<BTreeMap<i64, Map<String, Value>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, id: i64) -> Result<Option<UserDocument>, AppError> {
        let records = self.records.read().await;
        Ok(records.get(&id).map(|fields| UserDocument {
            id,
            fields: fields.clone(),
        }))
    }

    async fn list(&self) -> Result<Vec<UserDocument>, AppError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(id, fields)| UserDocument {
                id: *id,
                fields: fields.clone(),
            })
            .collect())
    }

    async fn insert(&self, doc: UserDocument) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(&doc.id) {
            return Ok(false);
        }
        records.insert(doc.id, strip_key_fields(doc.fields));
        Ok(true)
    }

    async fn merge(&self, id: i64, patch: Map<String, Value>) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        let Some(fields) = records.get_mut(&id) else {
            return Ok(false);
        };
        fields.extend(strip_key_fields(patch));
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
