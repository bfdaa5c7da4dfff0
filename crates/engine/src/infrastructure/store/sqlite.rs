//! SQLite-backed store adapter.
//!
//! One `kv` table holds both collections; values are stored as JSON text.
//! Batch writes run inside a single transaction so a request's deferred sets
//! land atomically.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{StoreBackend, StoreError, StoreKey};

pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub async fn connect(db_path: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| StoreError::backend("connect", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::backend("migrate", e))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StoreBackend for SqliteBackend {
    async fn fetch_many(
        &self,
        keys: &[StoreKey],
    ) -> Result<HashMap<StoreKey, serde_json::Value>, StoreError> {
        let mut found = HashMap::new();
        for key in keys {
            let row = sqlx::query("SELECT value FROM kv WHERE collection = ? AND id = ?")
                .bind(key.collection.as_str())
                .bind(key.id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::backend("fetch", e))?;

            if let Some(row) = row {
                let raw: String = row.get("value");
                let value = serde_json::from_str(&raw).map_err(StoreError::serialization)?;
                found.insert(*key, value);
            }
        }
        Ok(found)
    }

    async fn write_batch(
        &self,
        entries: Vec<(StoreKey, serde_json::Value)>,
    ) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::backend("write", e))?;

        for (key, value) in entries {
            let raw = serde_json::to_string(&value).map_err(StoreError::serialization)?;
            sqlx::query(
                r#"
                INSERT INTO kv (collection, id, value)
                VALUES (?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key.collection.as_str())
            .bind(key.id.to_string())
            .bind(raw)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::backend("write", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::backend("commit", e))
    }
}
