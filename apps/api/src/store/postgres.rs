use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

/// `DocumentStore` backed by the `documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn write_error(collection: &str, error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::Database(e) if e.is_unique_violation() => {
            StoreError::Duplicate(collection.to_string())
        }
        other => StoreError::Sql(other),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(&self, collection: &str, user_id: &str) -> Result<Vec<Document>, StoreError> {
        Ok(sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE collection = $1 AND user_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(collection)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_one(
        &self,
        collection: &str,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        Ok(sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE collection = $1 AND user_id = $2 AND id = $3",
        )
        .bind(collection)
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE collection = $1 AND data ->> $2 = $3
            ORDER BY created_at ASC
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        user_id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        Ok(sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (id, collection, user_id, data)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(collection)
        .bind(user_id)
        .bind(data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(collection, e))?)
    }

    async fn update(
        &self,
        collection: &str,
        user_id: &str,
        id: Uuid,
        data: Value,
    ) -> Result<Option<Document>, StoreError> {
        Ok(sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET data = $4, updated_at = now()
            WHERE collection = $1 AND user_id = $2 AND id = $3
            RETURNING *
            "#,
        )
        .bind(collection)
        .bind(user_id)
        .bind(id)
        .bind(data)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(collection, e))?)
    }

    async fn delete(&self, collection: &str, user_id: &str, id: Uuid) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM documents WHERE collection = $1 AND user_id = $2 AND id = $3")
                .bind(collection)
                .bind(user_id)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reassign_owner(&self, from: &str, to: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET user_id = $2, updated_at = now() WHERE user_id = $1 AND collection <> 'users'",
        )
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;
        info!(
            "Reassigned {} documents from owner {from} to {to}",
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }
}
