//! In-memory counter store - used as fallback when Redis is unavailable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatekeeper_core::ports::CounterStore;
use gatekeeper_core::StoreError;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory counter store using a HashMap with an async RwLock.
///
/// Expired entries are removed lazily on access. Counters are per-process,
/// not shared across instances; data is lost on restart.
pub struct InMemoryCounterStore {
    store: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(entry: &Entry) -> bool {
        Instant::now() > entry.expires_at
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let store = self.store.read().await;
        let entry = match store.get(key) {
            Some(e) => e,
            None => return Ok(None),
        };

        if Self::is_expired(entry) {
            drop(store);
            // Clean up the expired entry with a write lock
            let mut store = self.store.write().await;
            store.remove(key);
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
        // Single write lock for the whole read-modify-write, so concurrent
        // increments within one process cannot interleave.
        let mut store = self.store.write().await;

        match store.get_mut(key) {
            Some(entry) if !Self::is_expired(entry) => {
                let current: i64 = entry.value.parse().map_err(|_| {
                    StoreError::Serialization(format!(
                        "non-integer counter value for key {key}"
                    ))
                })?;
                let next = current + 1;
                entry.value = next.to_string();
                Ok(next)
            }
            _ => {
                store.insert(
                    key.to_string(),
                    Entry {
                        value: "1".to_string(),
                        expires_at: Instant::now() + ttl,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let store = self.store.read().await;
        let entry = match store.get(key) {
            Some(e) if !Self::is_expired(e) => e,
            _ => return Ok(None),
        };
        Ok(Some(
            entry.expires_at.saturating_duration_since(Instant::now()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryCounterStore::new();
        store
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("key1").await.unwrap(), Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_after_expiry() {
        let store = InMemoryCounterStore::new();
        store
            .set("key1", "value1", Duration::from_millis(50))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_increment_creates_and_counts() {
        let store = InMemoryCounterStore::new();
        assert_eq!(
            store.increment("c", Duration::from_secs(60)).await.unwrap(),
            1
        );
        assert_eq!(
            store.increment("c", Duration::from_secs(60)).await.unwrap(),
            2
        );
        assert_eq!(
            store.increment("c", Duration::from_secs(60)).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_increment_restarts_after_expiry() {
        let store = InMemoryCounterStore::new();
        store
            .increment("c", Duration::from_millis(50))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            store
                .increment("c", Duration::from_secs(60))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryCounterStore::new();
        store
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        store.delete("key1").await.unwrap();
        assert_eq!(store.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining() {
        let store = InMemoryCounterStore::new();
        store
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let ttl = store.ttl("key1").await.unwrap().unwrap();
        assert!(ttl <= Duration::from_secs(60));
        assert!(ttl > Duration::from_secs(58));
        assert_eq!(store.ttl("missing").await.unwrap(), None);
    }
}
