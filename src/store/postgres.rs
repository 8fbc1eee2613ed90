// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{KvError, KvStore};

/// Key-value store backed by the `kv_entries` table.
#[derive(Debug, Clone)]
pub struct PgKv {
    pool: PgPool,
}

impl PgKv {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations (creates `kv_entries`).
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl KvStore for PgKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read key '{}': {:?}", key, e);
                KvError::from(e)
            })?;

        row.map(|r| r.try_get::<String, _>("value"))
            .transpose()
            .map_err(KvError::from)
    }

    async fn put(&self, key: &str, value: String) -> Result<(), KvError> {
        // Upsert: last write wins, same as any eventually consistent KV.
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value)
            VALUES ($1, $2)
            ON CONFLICT(key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write key '{}': {:?}", key, e);
            KvError::from(e)
        })?;

        Ok(())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>, KvError> {
        let rows = sqlx::query(
            r#"
            SELECT key FROM kv_entries
            WHERE ($1::TEXT IS NULL OR starts_with(key, $1))
            ORDER BY key
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| r.try_get::<String, _>("key").map_err(KvError::from))
            .collect()
    }
}
