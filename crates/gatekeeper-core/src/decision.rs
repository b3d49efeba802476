//! The outcome of a rate limit check.

use serde::{Deserialize, Serialize};

/// Result of a single admission check.
///
/// Ephemeral: produced per check and attached to the outbound response
/// headers or rejection body, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// The policy's configured rate.
    pub limit: u32,
    /// Requests left in the current window (0 when denied).
    pub remaining: u32,
    /// Unix timestamp at which the quota resets.
    pub reset_at: i64,
    /// Seconds the client should wait before retrying; set only on denial.
    pub retry_after: Option<u64>,
}

impl Decision {
    pub fn allow(limit: u32, remaining: u32, reset_at: i64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining,
            reset_at,
            retry_after: None,
        }
    }

    pub fn deny(limit: u32, reset_at: i64, retry_after: u64) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            reset_at,
            retry_after: Some(retry_after),
        }
    }
}
