//! Limiter algorithm implementations.
//!
//! All three variants are keyed as `{algorithm}:{policy}:{identifier}` so
//! counter state never collides across algorithms or policies.
//!
//! Token bucket and sliding window are read-modify-write against the
//! counter store: concurrent checks for the same identifier may race and
//! briefly over-admit. That is an accepted property of approximate
//! enforcement, bounded to a single quota bucket. The fixed window uses
//! the store's atomic increment and does not race.

mod fixed_window;
mod sliding_window;
mod token_bucket;

pub use fixed_window::FixedWindowLimiter;
pub use sliding_window::SlidingWindowLimiter;
pub use token_bucket::TokenBucketLimiter;

use std::sync::Arc;

use gatekeeper_core::ports::{Clock, CounterStore, RateLimiter};
use gatekeeper_core::{AlgorithmKind, RateLimitPolicy};

/// Build the limiter for a policy and algorithm choice.
pub fn build(
    kind: AlgorithmKind,
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
) -> Arc<dyn RateLimiter> {
    match kind {
        AlgorithmKind::TokenBucket => Arc::new(TokenBucketLimiter::new(store, clock, policy)),
        AlgorithmKind::SlidingWindow => Arc::new(SlidingWindowLimiter::new(store, clock, policy)),
        AlgorithmKind::FixedWindow => Arc::new(FixedWindowLimiter::new(store, clock, policy)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::InMemoryCounterStore;
    use gatekeeper_core::PolicyName;

    fn policy(rate: u32, interval_secs: u64) -> RateLimitPolicy {
        RateLimitPolicy {
            name: PolicyName::Default,
            rate,
            interval_secs,
            burst: 0,
            block_duration_secs: None,
        }
    }

    /// The sliding window counts a true trailing interval, while the fixed
    /// window forgets everything at a boundary. Send N requests just before
    /// a window boundary, cross it, and send one more: fixed allows, sliding
    /// denies.
    #[tokio::test]
    async fn sliding_window_is_stricter_at_window_boundaries() {
        let store: Arc<dyn CounterStore> = Arc::new(InMemoryCounterStore::new());
        let sliding_clock = Arc::new(ManualClock::new(1799.5));
        let fixed_clock = Arc::new(ManualClock::new(1799.5));

        let sliding = SlidingWindowLimiter::new(
            store.clone(),
            sliding_clock.clone(),
            policy(3, 60),
        );
        let fixed = FixedWindowLimiter::new(store.clone(), fixed_clock.clone(), policy(3, 60));

        // Exhaust both quotas at t = 1799.5, inside window index 29
        for _ in 0..3 {
            assert!(sliding.is_allowed("client").await.unwrap().allowed);
            assert!(fixed.is_allowed("client").await.unwrap().allowed);
        }

        // Cross the boundary into window index 30
        sliding_clock.advance(1.0);
        fixed_clock.advance(1.0);

        let fixed_decision = fixed.is_allowed("client").await.unwrap();
        assert!(fixed_decision.allowed, "fixed window forgets at the boundary");

        let sliding_decision = sliding.is_allowed("client").await.unwrap();
        assert!(
            !sliding_decision.allowed,
            "sliding window still sees the burst from the previous second"
        );
    }

    #[tokio::test]
    async fn all_algorithms_enforce_the_admission_ceiling() {
        for kind in [
            AlgorithmKind::TokenBucket,
            AlgorithmKind::SlidingWindow,
            AlgorithmKind::FixedWindow,
        ] {
            let store: Arc<dyn CounterStore> = Arc::new(InMemoryCounterStore::new());
            let clock = Arc::new(ManualClock::new(10_000.0));
            let limiter = build(kind, store, clock, policy(4, 60));

            for i in 0..4 {
                let decision = limiter.is_allowed("ip:9.9.9.9").await.unwrap();
                assert!(decision.allowed, "{kind:?} denied request {i}");
            }

            let decision = limiter.is_allowed("ip:9.9.9.9").await.unwrap();
            assert!(!decision.allowed, "{kind:?} allowed the 5th request");
            assert_eq!(decision.remaining, 0);
            assert!(decision.retry_after.unwrap() > 0);
        }
    }
}
