//! Rate limiter port.

use async_trait::async_trait;

use crate::decision::Decision;
use crate::error::RateLimitError;
use crate::policy::RateLimitPolicy;

/// Rate limiter trait - abstraction over the limiter algorithms.
///
/// Implementations are keyed: two identifiers never share counter state,
/// so contention is bounded to a single quota bucket.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check whether a request from `identifier` is admitted, updating the
    /// persisted counter state as a side effect.
    async fn is_allowed(&self, identifier: &str) -> Result<Decision, RateLimitError>;

    /// The policy this limiter enforces.
    fn policy(&self) -> &RateLimitPolicy;
}
