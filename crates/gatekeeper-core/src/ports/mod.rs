//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod counter_store;
mod limiter;

pub use clock::Clock;
pub use counter_store::CounterStore;
pub use limiter::RateLimiter;
