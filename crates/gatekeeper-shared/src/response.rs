//! Standardized API response envelopes.

use serde::{Deserialize, Serialize};

/// Stable error codes for client-side handling.
pub mod codes {
    /// Rate limiting (5xxx)
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_5001";

    /// Server errors (9xxx)
    pub const INTERNAL_ERROR: &str = "SRV_9001";
    pub const SERVICE_UNAVAILABLE: &str = "SRV_9003";
}

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

/// Error payload: `{"code": ..., "message": ..., "retry_after": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Standard error envelope: `{"success": false, "error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                retry_after: None,
            },
        }
    }

    pub fn with_retry_after(mut self, retry_after: u64) -> Self {
        self.error.retry_after = Some(retry_after);
        self
    }

    // Common error constructors
    pub fn rate_limited(message: impl Into<String>, retry_after: u64) -> Self {
        Self::new(codes::RATE_LIMIT_EXCEEDED, message).with_retry_after(retry_after)
    }

    pub fn internal_error() -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            "An unexpected error occurred. Please try again later.",
        )
    }

    pub fn service_unavailable() -> Self {
        Self::new(
            codes::SERVICE_UNAVAILABLE,
            "The service is temporarily unavailable. Please try again later.",
        )
    }
}
