//! Fixed window limiter - cheapest algorithm, coarse at window boundaries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use gatekeeper_core::ports::{Clock, CounterStore, RateLimiter};
use gatekeeper_core::{AlgorithmKind, Decision, RateLimitError, RateLimitPolicy};

/// Fixed window rate limiter.
///
/// Counts requests per window index `floor(now / interval)`. The window
/// index is part of the key, so each boundary starts a fresh counter and
/// stale windows age out through their TTL; nothing is deleted explicitly.
///
/// Known limitation, kept on purpose: a client can fit up to `2 * rate`
/// requests into a short span straddling two adjacent windows.
pub struct FixedWindowLimiter {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    fn window_key(&self, identifier: &str, window_index: i64) -> String {
        format!(
            "{}:{}:{}:{}",
            AlgorithmKind::FixedWindow.prefix(),
            self.policy.name,
            identifier,
            window_index
        )
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn is_allowed(&self, identifier: &str) -> Result<Decision, RateLimitError> {
        let now = self.clock.now();
        let interval = self.policy.interval_secs;
        let window_index = (now / interval as f64).floor() as i64;
        let window_end = (window_index + 1) * interval as i64;
        let key = self.window_key(identifier, window_index);

        // Atomic at the store level, unlike the other two algorithms
        let count = self
            .store
            .increment(&key, Duration::from_secs(interval))
            .await?;

        if count <= self.policy.rate as i64 {
            Ok(Decision::allow(
                self.policy.rate,
                self.policy.rate.saturating_sub(count as u32),
                window_end,
            ))
        } else {
            let retry_after = (window_end as f64 - now).ceil().max(0.0) as u64 + 1;
            Ok(Decision::deny(self.policy.rate, window_end, retry_after))
        }
    }

    fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }
}
