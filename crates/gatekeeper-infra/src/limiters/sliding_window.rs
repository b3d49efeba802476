//! Sliding window limiter - precise trailing-window accounting.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use gatekeeper_core::ports::{Clock, CounterStore, RateLimiter};
use gatekeeper_core::{AlgorithmKind, Decision, RateLimitError, RateLimitPolicy, StoreError};

/// Sliding window rate limiter.
///
/// Stores the arrival timestamp of every request in the trailing window,
/// pruning stale entries on each read. More accurate than the fixed window
/// at the cost of one timestamp of memory per admitted request.
///
/// The stored list is bounded: entries older than the interval are dropped
/// on every access and denied requests are not appended, so the list never
/// grows past `rate` entries.
pub struct SlidingWindowLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    fn state_key(&self, identifier: &str) -> String {
        format!(
            "{}:{}:{}",
            AlgorithmKind::SlidingWindow.prefix(),
            self.policy.name,
            identifier
        )
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn is_allowed(&self, identifier: &str) -> Result<Decision, RateLimitError> {
        let key = self.state_key(identifier);
        let now = self.clock.now();
        let window_start = now - self.policy.interval_secs as f64;

        let mut timestamps: Vec<f64> = match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| RateLimitError::CorruptState {
                key: key.clone(),
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };

        timestamps.retain(|&t| t > window_start);

        if (timestamps.len() as u32) < self.policy.rate {
            timestamps.push(now);
            let raw = serde_json::to_string(&timestamps)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            let ttl = Duration::from_secs(self.policy.interval_secs * 2);
            self.store.set(&key, &raw, ttl).await?;

            Ok(Decision::allow(
                self.policy.rate,
                self.policy.rate - timestamps.len() as u32,
                (now as i64) + self.policy.interval_secs as i64,
            ))
        } else {
            // Denials are not persisted; the next read prunes again
            let oldest = timestamps.iter().copied().fold(f64::INFINITY, f64::min);
            let oldest = if oldest.is_finite() { oldest } else { now };
            let reset_at = oldest + self.policy.interval_secs as f64;
            let retry_after = (reset_at - now).ceil().max(0.0) as u64 + 1;

            Ok(Decision::deny(
                self.policy.rate,
                reset_at as i64,
                retry_after,
            ))
        }
    }

    fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::InMemoryCounterStore;
    use gatekeeper_core::PolicyName;

    fn limiter(rate: u32, interval_secs: u64) -> (SlidingWindowLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(500_000.0));
        let policy = RateLimitPolicy {
            name: PolicyName::Contact,
            rate,
            interval_secs,
            burst: 0,
            block_duration_secs: None,
        };
        (
            SlidingWindowLimiter::new(
                Arc::new(InMemoryCounterStore::new()),
                clock.clone(),
                policy,
            ),
            clock,
        )
    }

    #[tokio::test]
    async fn admits_up_to_rate_then_denies() {
        let (limiter, _) = limiter(3, 60);

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.is_allowed("k").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn requests_near_the_window_edge_are_still_counted() {
        let (limiter, clock) = limiter(3, 60);

        for _ in 0..3 {
            assert!(limiter.is_allowed("k").await.unwrap().allowed);
        }

        // Just shy of a full interval later, the burst is still visible
        clock.advance(59.5);
        assert!(!limiter.is_allowed("k").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn window_slides_open_after_the_interval() {
        let (limiter, clock) = limiter(3, 60);

        for _ in 0..3 {
            assert!(limiter.is_allowed("k").await.unwrap().allowed);
        }
        assert!(!limiter.is_allowed("k").await.unwrap().allowed);

        clock.advance(61.0);
        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[tokio::test]
    async fn retry_after_points_at_the_oldest_entry() {
        let (limiter, clock) = limiter(2, 60);

        assert!(limiter.is_allowed("k").await.unwrap().allowed);
        clock.advance(10.0);
        assert!(limiter.is_allowed("k").await.unwrap().allowed);
        clock.advance(10.0);

        // Oldest entry is 20s old; it leaves the window in 40s
        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after, Some(41));

        clock.advance(20.0);
        let decision = limiter.is_allowed("k").await.unwrap();
        assert_eq!(decision.retry_after, Some(21));
    }

    #[tokio::test]
    async fn zero_rate_always_denies() {
        let (limiter, _) = limiter(0, 60);
        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after, Some(61));
    }

    #[tokio::test]
    async fn identifiers_do_not_share_quota() {
        let (limiter, _) = limiter(1, 60);

        assert!(limiter.is_allowed("a").await.unwrap().allowed);
        assert!(!limiter.is_allowed("a").await.unwrap().allowed);
        assert!(limiter.is_allowed("b").await.unwrap().allowed);
    }
}
