use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

/// In-process `DocumentStore`. Keeps insertion order, which doubles as
/// `created_at` order.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection across all owners.
    pub async fn count(&self, collection: &str) -> usize {
        self.documents
            .read()
            .await
            .iter()
            .filter(|d| d.collection == collection)
            .count()
    }
}

fn matches(doc: &Document, collection: &str, user_id: &str) -> bool {
    doc.collection == collection && doc.user_id == user_id
}

fn user_email(data: &Value) -> Option<String> {
    data.get("email")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}

/// Mirrors the case-insensitive unique index on `users.email`.
fn check_unique(
    documents: &[Document],
    collection: &str,
    id: Uuid,
    data: &Value,
) -> Result<(), StoreError> {
    if collection != "users" {
        return Ok(());
    }
    let Some(email) = user_email(data) else {
        return Ok(());
    };
    let taken = documents.iter().any(|d| {
        d.collection == "users" && d.id != id && user_email(&d.data).as_deref() == Some(email.as_str())
    });
    if taken {
        return Err(StoreError::Duplicate(collection.to_string()));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, collection: &str, user_id: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| matches(d, collection, user_id))
            .cloned()
            .collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id && matches(d, collection, user_id))
            .cloned())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| {
                d.collection == collection
                    && d.data.get(field).and_then(|v| v.as_str()) == Some(value)
            })
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        collection: &str,
        id: Uuid,
        user_id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let mut documents = self.documents.write().await;
        check_unique(&documents, collection, id, &data)?;
        let now = Utc::now();
        let doc = Document {
            id,
            collection: collection.to_string(),
            user_id: user_id.to_string(),
            data,
            created_at: now,
            updated_at: now,
        };
        documents.push(doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        user_id: &str,
        id: Uuid,
        data: Value,
    ) -> Result<Option<Document>, StoreError> {
        let mut documents = self.documents.write().await;
        let Some(index) = documents
            .iter()
            .position(|d| d.id == id && matches(d, collection, user_id))
        else {
            return Ok(None);
        };
        check_unique(&documents, collection, id, &data)?;
        let doc = &mut documents[index];
        doc.data = data;
        doc.updated_at = Utc::now();
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, user_id: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| !(d.id == id && matches(d, collection, user_id)));
        Ok(documents.len() < before)
    }

    async fn reassign_owner(&self, from: &str, to: &str) -> Result<u64, StoreError> {
        let mut moved = 0;
        for doc in self.documents.write().await.iter_mut() {
            if doc.user_id == from && doc.collection != "users" {
                doc.user_id = to.to_string();
                doc.updated_at = Utc::now();
                moved += 1;
            }
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scoped_by_owner() {
        let store = MemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store
            .insert("skills", id, "alice", json!({"name": "Rust"}))
            .await
            .unwrap();

        assert!(store.find_one("skills", "bob", id).await.unwrap().is_none());
        assert!(store
            .update("skills", "bob", id, json!({"name": "Go"}))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete("skills", "bob", id).await.unwrap());
        assert_eq!(store.find("skills", "alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_field_is_unscoped() {
        let store = MemoryDocumentStore::new();
        store
            .insert("users", Uuid::new_v4(), "u1", json!({"email": "a@x.io"}))
            .await
            .unwrap();
        store
            .insert("users", Uuid::new_v4(), "u2", json!({"email": "b@x.io"}))
            .await
            .unwrap();
        let found = store.find_by_field("users", "email", "b@x.io").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, "u2");
    }

    #[tokio::test]
    async fn test_user_email_is_unique_ignoring_case() {
        let store = MemoryDocumentStore::new();
        let first = Uuid::new_v4();
        store
            .insert("users", first, "u1", json!({"email": "jane@x.io"}))
            .await
            .unwrap();
        let err = store
            .insert("users", Uuid::new_v4(), "u2", json!({"email": "Jane@X.io"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.count("users").await, 1);

        // Rewriting the same user keeps its own email.
        assert!(store
            .update("users", "u1", first, json!({"email": "jane@x.io", "firstName": "Jane"}))
            .await
            .unwrap()
            .is_some());
        // Other collections are not constrained.
        for _ in 0..2 {
            store
                .insert("contacts", Uuid::new_v4(), "u1", json!({"email": "jane@x.io"}))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_reassign_owner_skips_users() {
        let store = MemoryDocumentStore::new();
        store
            .insert("users", Uuid::new_v4(), "legacy", json!({}))
            .await
            .unwrap();
        store
            .insert("goals", Uuid::new_v4(), "legacy", json!({}))
            .await
            .unwrap();
        store
            .insert("contacts", Uuid::new_v4(), "legacy", json!({}))
            .await
            .unwrap();

        assert_eq!(store.reassign_owner("legacy", "real").await.unwrap(), 2);
        assert_eq!(store.find("goals", "real").await.unwrap().len(), 1);
        assert_eq!(store.find("users", "legacy").await.unwrap().len(), 1);
    }
}
