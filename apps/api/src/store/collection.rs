use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};
use crate::errors::AppError;
use crate::resources::Resource;

/// A typed document as returned to clients: the resource body flattened next
/// to its id, owner and timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: String,
    #[serde(flatten)]
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T: DeserializeOwned> TryFrom<Document> for Stored<T> {
    type Error = StoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        Ok(Stored {
            id: doc.id,
            user_id: doc.user_id,
            data: serde_json::from_value(doc.data)?,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

/// Typed view over one collection of a `DocumentStore`.
pub struct Collection<'a, R> {
    store: &'a dyn DocumentStore,
    _resource: PhantomData<R>,
}

impl<'a, R: Resource> Collection<'a, R> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _resource: PhantomData,
        }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Stored<R>>, AppError> {
        let docs = self.store.find(R::COLLECTION, user_id).await?;
        decode_all(docs)
    }

    /// Fetches `{id, user_id}`; absent and not-owned are the same 404.
    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<Stored<R>, AppError> {
        self.store
            .find_one(R::COLLECTION, user_id, id)
            .await?
            .ok_or_else(|| not_found::<R>(id))
            .and_then(|doc| Ok(Stored::try_from(doc)?))
    }

    pub async fn find_by(&self, field: &str, value: &str) -> Result<Vec<Stored<R>>, AppError> {
        let docs = self.store.find_by_field(R::COLLECTION, field, value).await?;
        decode_all(docs)
    }

    pub async fn insert(&self, user_id: &str, body: &R) -> Result<Stored<R>, AppError> {
        self.insert_with_id(Uuid::new_v4(), user_id, body).await
    }

    pub async fn insert_with_id(
        &self,
        id: Uuid,
        user_id: &str,
        body: &R,
    ) -> Result<Stored<R>, AppError> {
        let data = serde_json::to_value(body).map_err(StoreError::from)?;
        let doc = self.store.insert(R::COLLECTION, id, user_id, data).await?;
        Ok(Stored::try_from(doc)?)
    }

    pub async fn replace(&self, user_id: &str, id: Uuid, body: &R) -> Result<Stored<R>, AppError> {
        let data = serde_json::to_value(body).map_err(StoreError::from)?;
        self.store
            .update(R::COLLECTION, user_id, id, data)
            .await?
            .ok_or_else(|| not_found::<R>(id))
            .and_then(|doc| Ok(Stored::try_from(doc)?))
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), AppError> {
        if self.store.delete(R::COLLECTION, user_id, id).await? {
            Ok(())
        } else {
            Err(not_found::<R>(id))
        }
    }
}

fn decode_all<R: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<Stored<R>>, AppError> {
    docs.into_iter()
        .map(|doc| Stored::try_from(doc).map_err(AppError::from))
        .collect()
}

fn not_found<R: Resource>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {id} not found", R::NAME))
}
