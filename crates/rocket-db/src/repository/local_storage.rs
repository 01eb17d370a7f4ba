//! # Local Storage Repository
//!
//! Durable key-value rows in the `local_storage` table.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┬───────────────────┐
//! │ key (PK)             │ value                        │ updated_at        │
//! ├──────────────────────┼──────────────────────────────┼───────────────────┤
//! │ @RocketShoes:cart    │ [{"id":5,...,"amount":1}]    │ 2026-10-19T14:…Z  │
//! └──────────────────────┴──────────────────────────────┴───────────────────┘
//! ```
//!
//! Every write is a single-statement upsert, so a reader never sees a
//! partially written value.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::kv::KeyValueStore;

/// SQLite-backed local storage.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    /// Creates a new LocalStorage over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        LocalStorage { pool }
    }

    /// When the value under `key` was last written.
    pub async fn updated_at(&self, key: &str) -> DbResult<Option<DateTime<Utc>>> {
        let updated_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT updated_at FROM local_storage WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated_at)
    }
}

#[async_trait]
impl KeyValueStore for LocalStorage {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "Read local storage item");
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "Wrote local storage item");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
