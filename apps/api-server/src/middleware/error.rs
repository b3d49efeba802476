//! Error handling - structured JSON error responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use gatekeeper_core::RateLimitError;
use gatekeeper_shared::ErrorResponse;
use thiserror::Error;

/// Application-level error type.
///
/// Counter store failures land here deliberately: enforcement fails closed
/// instead of waving requests through while the store is down.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Rate limiter unavailable: {0}")]
    LimiterUnavailable(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LimiterUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
            AppError::LimiterUnavailable(detail) => {
                tracing::error!("Rate limiter unavailable: {}", detail);
                ErrorResponse::service_unavailable()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::Store(e) => AppError::LimiterUnavailable(e.to_string()),
            RateLimitError::CorruptState { .. } => AppError::Internal(err.to_string()),
        }
    }
}
