//! Domain-level error types.

use thiserror::Error;

/// Counter store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

/// Rate limiter errors.
///
/// An unreachable counter store is deliberately not absorbed here: it
/// surfaces to the caller so enforcement fails closed instead of silently
/// disabling rate limiting during an outage.
#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Counter store error: {0}")]
    Store(#[from] StoreError),

    #[error("Corrupt counter state for key {key}: {reason}")]
    CorruptState { key: String, reason: String },
}
