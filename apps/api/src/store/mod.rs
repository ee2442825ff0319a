//! Document storage: ownership-scoped collections of JSON documents.
//!
//! Every resource is a collection of documents keyed by `id` and owned by a
//! string `user_id`. `AppState` holds an `Arc<dyn DocumentStore>`; production
//! uses `PgDocumentStore`, tests use `MemoryDocumentStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

pub mod collection;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod tokens;

pub use collection::{Collection, Stored};
#[cfg(test)]
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A unique index rejected the write, e.g. a second user with the same email.
    #[error("Duplicate document in {0}")]
    Duplicate(String),
}

/// A raw stored document.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    pub user_id: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every read and write except `find_by_field` and `reassign_owner` is scoped
/// by `(collection, user_id)`; a document owned by someone else never matches.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents the user owns in a collection, oldest first.
    async fn find(&self, collection: &str, user_id: &str) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError>;

    /// Unscoped lookup on a top-level string field of the body, e.g. `users.email`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        user_id: &str,
        data: Value,
    ) -> Result<Document, StoreError>;

    /// Replaces the body of `{id, user_id}`. Returns `None` when nothing matched.
    async fn update(
        &self,
        collection: &str,
        user_id: &str,
        id: Uuid,
        data: Value,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, user_id: &str, id: Uuid) -> Result<bool, StoreError>;

    /// Moves every non-user document owned by `from` to `to`. Used by the
    /// `migrate-owner` command for records written under legacy ids.
    async fn reassign_owner(&self, from: &str, to: &str) -> Result<u64, StoreError>;
}
