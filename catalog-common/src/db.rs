use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::debug;

/// Local key/value storage backed by a SQLite file.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub value: String,
    pub saved_at: DateTime<Utc>,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url {database_url}"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Self::from_pool(pool).await
    }

    /// A private database that lives as long as the returned handle.
    pub async fn in_memory() -> anyhow::Result<Self> {
        // Every connection to :memory: is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { pool })
    }

    pub async fn get_item(&self, key: &str) -> anyhow::Result<Option<StoredValue>> {
        let row = sqlx::query(
            r#"
            SELECT value, saved_at FROM local_storage
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let saved_at: String = row.try_get("saved_at")?;
                Ok(Some(StoredValue {
                    value: row.try_get("value")?,
                    saved_at: DateTime::parse_from_rfc3339(&saved_at)?.with_timezone(&Utc),
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        debug!("Writing local storage key {}", key);

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, saved_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        debug!("Removing local storage key {}", key);

        sqlx::query(
            r#"
            DELETE FROM local_storage
            WHERE key = ?
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
