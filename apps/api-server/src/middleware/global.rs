//! Catch-all rate limiting middleware.
//!
//! Applied at the app level in front of every route, keyed by client IP
//! against the single global policy. Endpoints carrying their own
//! [`RateLimit`](crate::middleware::rate_limit::RateLimit) wrapper are
//! checked by both; the stricter limit wins.
//!
//! Skip paths are prefix-matched and pass through untouched, without quota
//! headers. Health checks and static assets should never burn quota.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};

use gatekeeper_core::Scope;
use gatekeeper_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::middleware::identity;
use crate::middleware::rate_limit::{annotate, reject};
use crate::state::AppState;

const DENY_MESSAGE: &str = "Too many requests. Please try again later.";

/// Global rate limit transform.
pub struct GlobalRateLimit {
    limiter: Arc<dyn RateLimiter>,
    skip_paths: Arc<Vec<String>>,
}

impl GlobalRateLimit {
    pub fn new(state: &AppState, skip_paths: Vec<String>) -> Self {
        Self {
            limiter: state.global_limiter.clone(),
            skip_paths: Arc::new(skip_paths),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GlobalRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = GlobalRateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GlobalRateLimitService {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
            skip_paths: Arc::clone(&self.skip_paths),
        }))
    }
}

pub struct GlobalRateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    skip_paths: Arc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for GlobalRateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let skipped = self
            .skip_paths
            .iter()
            .any(|prefix| req.path().starts_with(prefix.as_str()));

        if skipped {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let service = Rc::clone(&self.service);
        let limiter = Arc::clone(&self.limiter);
        let identifier = identity::resolve(&req, Scope::Ip);

        Box::pin(async move {
            let decision = limiter
                .is_allowed(&identifier)
                .await
                .map_err(AppError::from)?;

            if decision.allowed {
                let mut res = service.call(req).await?.map_into_left_body();
                annotate(&mut res, &decision);
                return Ok(res);
            }

            tracing::warn!(
                identifier = %identifier,
                retry_after = ?decision.retry_after,
                "Global rate limit exceeded"
            );

            Ok(reject(req, &decision, DENY_MESSAGE))
        })
    }
}
