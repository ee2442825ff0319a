//! Short-lived single-use tokens: password resets and OAuth `state` values.

#[cfg(test)]
use std::collections::HashMap;
use std::time::Duration;
#[cfg(test)]
use std::time::Instant;

use async_trait::async_trait;
#[cfg(test)]
use tokio::sync::Mutex;

use super::StoreError;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Stores `value` under `key` for `ttl`, replacing any previous value.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns and removes the value. Expired or unknown keys yield `None`.
    async fn take(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Redis-backed token store (`SET EX` + `GETDEL`).
pub struct RedisTokenStore {
    client: redis::Client,
}

impl RedisTokenStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        Ok(redis::cmd("GETDEL")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?)
    }
}

/// In-process token store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .await
            .remove(key)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(value, _)| value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = MemoryTokenStore::new();
        store
            .put("reset:abc", "user-1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.take("reset:abc").await.unwrap().as_deref(),
            Some("user-1")
        );
        assert_eq!(store.take("reset:abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_token_is_gone() {
        let store = MemoryTokenStore::new();
        store
            .put("state:x", "google", Duration::from_millis(0))
            .await
            .unwrap();
        assert_eq!(store.take("state:x").await.unwrap(), None);
    }
}
