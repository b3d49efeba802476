//! Redis counter store implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use gatekeeper_core::ports::CounterStore;
use gatekeeper_core::StoreError;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Key prefix for all counter keys
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "ratelimit".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("RATE_LIMIT_KEY_PREFIX")
                .unwrap_or_else(|_| "ratelimit".to_string()),
        }
    }
}

/// Redis-backed counter store.
///
/// Uses a connection manager for automatic reconnection. `increment` runs a
/// Lua script so INCR and the first-write EXPIRE are atomic.
pub struct RedisCounterStore {
    conn: ConnectionManager,
    config: RedisConfig,
    incr_script: Script,
}

impl RedisCounterStore {
    pub async fn new(config: RedisConfig) -> Result<Self, StoreError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| StoreError::Connection("Connection timed out".to_string()))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let incr_script = Script::new(
            r#"
            local key = KEYS[1]
            local ttl_secs = tonumber(ARGV[1])

            local current = redis.call('INCR', key)
            if current == 1 then
                redis.call('EXPIRE', key, ttl_secs)
            end

            return current
            "#,
        );

        tracing::info!(url = %config.url, "Connected to Redis counter store");

        Ok(Self {
            conn,
            config,
            incr_script,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, StoreError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.make_key(key))
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(self.make_key(key), value, ttl.as_secs().max(1))
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        self.incr_script
            .key(self.make_key(key))
            .arg(ttl.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.make_key(key))
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.conn.clone();
        let secs: i64 = redis::cmd("TTL")
            .arg(self.make_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Operation(e.to_string()))?;

        // -2 means the key is absent, -1 means no expiry was set
        if secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(secs as u64)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_test_store() -> Option<RedisCounterStore> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            key_prefix: "test_gatekeeper".to_string(),
        };

        RedisCounterStore::new(config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_set_get_delete() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => return,
        };

        store
            .set("k1", "v1", Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some("v1".to_string()));

        store.delete("k1").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redis_increment_sets_ttl_once() {
        let store = match get_test_store().await {
            Some(s) => s,
            None => return,
        };

        store.delete("incr_key").await.unwrap();

        assert_eq!(
            store
                .increment("incr_key", Duration::from_secs(30))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .increment("incr_key", Duration::from_secs(30))
                .await
                .unwrap(),
            2
        );

        let ttl = store.ttl("incr_key").await.unwrap().unwrap();
        assert!(ttl <= Duration::from_secs(30));

        store.delete("incr_key").await.unwrap();
    }
}
