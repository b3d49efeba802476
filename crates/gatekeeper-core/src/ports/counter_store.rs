//! Counter store port.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;

/// Shared key-value store holding per-key counter state with TTL expiry.
///
/// Values are opaque strings; limiters serialize their state as JSON.
/// Stale state is never deleted explicitly - every write carries a TTL and
/// expiry is the store's responsibility.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Get a value, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Atomically increment an integer counter, creating it with `ttl` on
    /// first use. Returns the post-increment value.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<i64, StoreError>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remaining time-to-live, `None` if the key is absent.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;
}
