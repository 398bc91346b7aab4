// src/store/sqlite.rs

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};

use super::{StoreError, TextStore};
use crate::models::text::{NO_PARENT, NewText, Text};

/// Column list shared across queries.
const COLUMNS: &str = "id, parent_id, username, text, created_at";

/// How long a connection waits for another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// `TextStore` backed by a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteTextStore {
    pool: SqlitePool,
}

impl SqliteTextStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database.
    ///
    /// Each SQLite connection to `:memory:` sees its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TextStore for SqliteTextStore {
    async fn create(&self, new_text: &NewText) -> Result<Text, StoreError> {
        // Holds the write lock from the parent check through the insert.
        // Rolled back on drop if any step below fails.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let parent_id = new_text.parent_id();
        if parent_id != NO_PARENT {
            let parent = sqlx::query_scalar::<_, i64>("SELECT id FROM texts WHERE id = ?")
                .bind(parent_id)
                .fetch_optional(&mut *tx)
                .await?;

            if parent.is_none() {
                return Err(StoreError::ParentNotFound(parent_id));
            }
        }

        let query = format!(
            "INSERT INTO texts (parent_id, username, text, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        let text = sqlx::query_as::<_, Text>(&query)
            .bind(parent_id)
            .bind(new_text.username())
            .bind(new_text.text())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(id = text.id, parent_id, "Inserted text");
        Ok(text)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Text>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM texts WHERE id = ?");
        let text = sqlx::query_as::<_, Text>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(text)
    }

    async fn list_by_parent(
        &self,
        parent_id: i64,
        limit: i64,
        page: i64,
    ) -> Result<Vec<Text>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM texts
             WHERE parent_id = ?
             ORDER BY id ASC
             LIMIT ? OFFSET ?"
        );
        let texts = sqlx::query_as::<_, Text>(&query)
            .bind(parent_id)
            .bind(limit)
            .bind(limit.saturating_mul(page))
            .fetch_all(&self.pool)
            .await?;
        Ok(texts)
    }

    async fn list_children(&self, parent_id: i64) -> Result<Vec<Text>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM texts
             WHERE parent_id = ?
             ORDER BY id ASC"
        );
        let texts = sqlx::query_as::<_, Text>(&query)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(texts)
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> SqliteTextStore {
    let store = SqliteTextStore::in_memory().await.unwrap();
    store.migrate().await.unwrap();
    store
}
