//! # Gatekeeper Infrastructure
//!
//! Concrete implementations of the ports defined in `gatekeeper-core`:
//! counter stores, clocks, and the limiter algorithms.
//!
//! ## Feature Flags
//!
//! - `redis` (default) - Redis-backed counter store
//! - `minimal` - In-memory only, no external dependencies

pub mod clock;
pub mod limiters;
pub mod store;

// Re-exports - In-Memory
pub use clock::{ManualClock, SystemClock};
pub use limiters::{FixedWindowLimiter, SlidingWindowLimiter, TokenBucketLimiter};
pub use store::InMemoryCounterStore;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisCounterStore};
