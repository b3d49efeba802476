//! Token bucket limiter - smooth rate enforcement that tolerates short bursts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use gatekeeper_core::ports::{Clock, CounterStore, RateLimiter};
use gatekeeper_core::{AlgorithmKind, Decision, RateLimitError, RateLimitPolicy, StoreError};

/// Persisted bucket state. Tokens stay fractional between checks;
/// truncation to an integer happens only when reporting `remaining`.
#[derive(Debug, Serialize, Deserialize)]
struct BucketState {
    tokens: f64,
    last_update: f64,
}

/// Token bucket rate limiter.
///
/// The bucket starts full at `rate` tokens, refills at `rate / interval`
/// tokens per second up to a ceiling of `rate + burst`, and each admitted
/// request consumes one token. The first check for an identifier always
/// succeeds.
pub struct TokenBucketLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
}

impl TokenBucketLimiter {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Tokens added per second.
    fn refill_rate(&self) -> f64 {
        self.policy.rate as f64 / self.policy.interval_secs as f64
    }

    fn state_key(&self, identifier: &str) -> String {
        format!(
            "{}:{}:{}",
            AlgorithmKind::TokenBucket.prefix(),
            self.policy.name,
            identifier
        )
    }

    async fn persist(&self, key: &str, state: &BucketState) -> Result<(), RateLimitError> {
        let raw = serde_json::to_string(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        // 2x interval tolerates clock and refill drift before expiry
        let ttl = Duration::from_secs(self.policy.interval_secs * 2);
        self.store.set(key, &raw, ttl).await?;
        Ok(())
    }
}

#[async_trait]
impl RateLimiter for TokenBucketLimiter {
    async fn is_allowed(&self, identifier: &str) -> Result<Decision, RateLimitError> {
        let key = self.state_key(identifier);
        let now = self.clock.now();
        let ceiling = (self.policy.rate + self.policy.burst) as f64;

        let mut state = match self.store.get(&key).await? {
            Some(raw) => {
                let mut state: BucketState =
                    serde_json::from_str(&raw).map_err(|e| RateLimitError::CorruptState {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                let elapsed = now - state.last_update;
                state.tokens = (state.tokens + elapsed * self.refill_rate()).min(ceiling);
                state.last_update = now;
                state
            }
            None => BucketState {
                tokens: self.policy.rate as f64,
                last_update: now,
            },
        };

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            self.persist(&key, &state).await?;

            Ok(Decision::allow(
                self.policy.rate,
                state.tokens.floor() as u32,
                (now as i64) + self.policy.interval_secs as i64,
            ))
        } else {
            // Persist the refreshed (undecremented) state so the refill
            // timestamp does not go stale while the client is throttled
            self.persist(&key, &state).await?;

            let refill = self.refill_rate();
            let retry_after = if refill > 0.0 {
                ((1.0 - state.tokens) / refill).ceil() as u64 + 1
            } else {
                self.policy.interval_secs + 1
            };

            Ok(Decision::deny(
                self.policy.rate,
                (now as i64) + retry_after as i64,
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

    fn limiter(rate: u32, interval_secs: u64, burst: u32) -> (TokenBucketLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000.0));
        let policy = RateLimitPolicy {
            name: PolicyName::Login,
            rate,
            interval_secs,
            burst,
            block_duration_secs: None,
        };
        (
            TokenBucketLimiter::new(
                Arc::new(InMemoryCounterStore::new()),
                clock.clone(),
                policy,
            ),
            clock,
        )
    }

    #[tokio::test]
    async fn first_check_always_succeeds() {
        let (limiter, _) = limiter(1, 60, 0);
        let decision = limiter.is_allowed("ip:1.2.3.4").await.unwrap();
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn login_scenario_five_allowed_then_denied() {
        // rate 5 / 60s, identifier ip:1.2.3.4
        let (limiter, _) = limiter(5, 60, 10);

        for expected_remaining in [4, 3, 2, 1, 0] {
            let decision = limiter.is_allowed("ip:1.2.3.4").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
            assert_eq!(decision.limit, 5);
        }

        let decision = limiter.is_allowed("ip:1.2.3.4").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        let retry_after = decision.retry_after.unwrap();
        assert!((1..=60).contains(&retry_after));
    }

    #[tokio::test]
    async fn refill_is_monotonic() {
        // rate 10 / 60s refills one token every 6 seconds
        let (limiter, clock) = limiter(10, 60, 0);

        for _ in 0..10 {
            assert!(limiter.is_allowed("k").await.unwrap().allowed);
        }
        assert!(!limiter.is_allowed("k").await.unwrap().allowed);

        clock.advance(6.0);
        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);

        clock.advance(12.0);
        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[tokio::test]
    async fn refill_caps_at_rate_plus_burst() {
        let (limiter, clock) = limiter(5, 60, 3);

        // Drain the initial 5 tokens, then idle for many intervals
        for _ in 0..5 {
            assert!(limiter.is_allowed("k").await.unwrap().allowed);
        }
        clock.advance(3600.0);

        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(decision.allowed);
        // Ceiling is rate + burst = 8; one token consumed
        assert_eq!(decision.remaining, 7);
    }

    #[tokio::test]
    async fn full_interval_restores_the_rate() {
        let (limiter, clock) = limiter(10, 60, 0);

        for _ in 0..10 {
            assert!(limiter.is_allowed("k").await.unwrap().allowed);
        }
        assert!(!limiter.is_allowed("k").await.unwrap().allowed);

        clock.advance(60.0);
        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 9);
    }

    #[tokio::test]
    async fn identifiers_do_not_share_quota() {
        let (limiter, _) = limiter(2, 60, 0);

        assert!(limiter.is_allowed("ip:1.1.1.1").await.unwrap().allowed);
        assert!(limiter.is_allowed("ip:1.1.1.1").await.unwrap().allowed);
        assert!(!limiter.is_allowed("ip:1.1.1.1").await.unwrap().allowed);

        let decision = limiter.is_allowed("ip:2.2.2.2").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[tokio::test]
    async fn retry_after_shrinks_as_time_passes() {
        let (limiter, clock) = limiter(5, 300, 0);

        for _ in 0..5 {
            assert!(limiter.is_allowed("k").await.unwrap().allowed);
        }

        let first = limiter.is_allowed("k").await.unwrap().retry_after.unwrap();
        assert!(first > 0);

        clock.advance(10.0);
        let second = limiter.is_allowed("k").await.unwrap().retry_after.unwrap();
        assert!(second <= first);
    }

    #[tokio::test]
    async fn zero_rate_always_denies() {
        let (limiter, _) = limiter(0, 60, 0);
        let decision = limiter.is_allowed("k").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after, Some(61));
    }
}
