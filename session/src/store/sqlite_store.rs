//! SQLite-backed [`ReservationStore`].
//!
//! The cache is kept as one JSON document per namespace in a small key/value
//! table, so several stores (or programs) can share one database file.
use anyhow::Context;
use async_trait::async_trait;
use corelib::PerUserReservationCache;
use sqlx::{Row, SqlitePool};

use super::ReservationStore;

pub const DEFAULT_NAMESPACE: &str = "siso";

pub struct SQLiteReservationStore {
    pool: SqlitePool,
    namespace: String,
}

impl SQLiteReservationStore {
    /// Connect to `url` and ensure the schema exists.
    pub async fn new(url: &str, namespace: impl Into<String>) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("failed to open database {url}"))?;
        Self::from_pool(pool, namespace).await
    }

    pub async fn from_pool(pool: SqlitePool, namespace: impl Into<String>) -> anyhow::Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                namespace TEXT PRIMARY KEY,
                value_json TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            namespace: namespace.into(),
        })
    }
}

#[async_trait]
impl ReservationStore for SQLiteReservationStore {
    async fn get(&self) -> anyhow::Result<PerUserReservationCache> {
        let row = sqlx::query("SELECT value_json FROM kv_store WHERE namespace = ?")
            .bind(&self.namespace)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(PerUserReservationCache::new());
        };

        let json: String = row.try_get("value_json")?;
        serde_json::from_str(&json)
            .with_context(|| format!("corrupt cache document in namespace {}", self.namespace))
    }

    /// Upsert: the namespace's document is replaced wholesale.
    async fn set(&self, cache: &PerUserReservationCache) -> anyhow::Result<()> {
        let json = serde_json::to_string(cache)?;

        sqlx::query(
            r#"
            INSERT INTO kv_store (namespace, value_json)
            VALUES (?, ?)
            ON CONFLICT(namespace) DO UPDATE SET
                value_json = excluded.value_json,
                updated_at = CURRENT_TIMESTAMP;
        "#,
        )
        .bind(&self.namespace)
        .bind(json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
