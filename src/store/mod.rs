// src/store/mod.rs

//! Storage accessor for texts.
//!
//! The core only talks to `TextStore`; `SqliteTextStore` is the durable
//! implementation used by the server and the tests.

pub mod sqlite;

use async_trait::async_trait;

use crate::models::text::{NewText, Text};

pub use sqlite::SqliteTextStore;

/// Failures raised by a `TextStore`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `create` referenced a parent id that is not stored.
    #[error("Parent text {0} not found")]
    ParentNotFound(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Append-only access to the texts table.
///
/// Every method is one logical operation; implementations scope any
/// transaction to the call and release it on every exit path.
#[async_trait]
pub trait TextStore: Send + Sync {
    /// Inserts a text, assigning `id` and `created_at`.
    /// Fails with `StoreError::ParentNotFound` when the parent is missing.
    async fn create(&self, new_text: &NewText) -> Result<Text, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Text>, StoreError>;

    /// One page of direct children of `parent_id`, ordered by id.
    ///
    /// `page` counts in units of `limit`: rows `[page * limit, (page + 1) * limit)`.
    async fn list_by_parent(
        &self,
        parent_id: i64,
        limit: i64,
        page: i64,
    ) -> Result<Vec<Text>, StoreError>;

    /// All direct children of `parent_id`, ordered by id. Unpaginated.
    async fn list_children(&self, parent_id: i64) -> Result<Vec<Text>, StoreError>;
}
