//! Per-endpoint rate limiting middleware.
//!
//! Wrap a resource with [`RateLimit`] to enforce a named policy against an
//! identifier scope. Allowed requests pass through with quota headers
//! attached; denied requests get a 429 with a structured body and never
//! reach the handler. Counter store failures reject with 503.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpResponse};

use gatekeeper_core::ports::{Clock, CounterStore, RateLimiter};
use gatekeeper_core::{AlgorithmKind, Decision, PolicyName, RateLimitPolicy, Scope};
use gatekeeper_infra::limiters;
use gatekeeper_shared::ErrorResponse;

use crate::middleware::error::AppError;
use crate::middleware::identity;
use crate::state::AppState;

const DENY_MESSAGE: &str = "Rate limit exceeded. Please slow down.";

struct Inner {
    limiter: Arc<dyn RateLimiter>,
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    scope: Scope,
}

/// Per-endpoint rate limit transform.
pub struct RateLimit {
    inner: Arc<Inner>,
}

impl RateLimit {
    /// Enforce a named policy from the policy table.
    pub fn new(state: &AppState, name: PolicyName, scope: Scope, algorithm: AlgorithmKind) -> Self {
        Self::with_policy(state, RateLimitPolicy::named(name), scope, algorithm)
    }

    /// Enforce a custom policy, e.g. one carrying a block duration.
    pub fn with_policy(
        state: &AppState,
        policy: RateLimitPolicy,
        scope: Scope,
        algorithm: AlgorithmKind,
    ) -> Self {
        let limiter = limiters::build(algorithm, state.store.clone(), state.clock.clone(), policy);
        Self {
            inner: Arc::new(Inner {
                limiter,
                store: state.store.clone(),
                clock: state.clock.clone(),
                scope,
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            inner: Arc::clone(&self.inner),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    inner: Arc<Inner>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let inner = Arc::clone(&self.inner);
        let identifier = identity::resolve(&req, inner.scope);

        Box::pin(async move {
            let policy = inner.limiter.policy();

            // A standing block from an earlier violation short-circuits the
            // algorithm entirely.
            if let Some(block_secs) = policy.block_duration_secs {
                let key = block_key(policy, &identifier);
                let blocked = inner.store.get(&key).await.map_err(store_error)?;

                if blocked.is_some() {
                    let retry_after = inner
                        .store
                        .ttl(&key)
                        .await
                        .map_err(store_error)?
                        .map(|ttl| ttl.as_secs())
                        .unwrap_or(block_secs);

                    tracing::warn!(
                        identifier = %identifier,
                        policy = %policy.name,
                        retry_after,
                        "Request rejected by standing block"
                    );

                    let decision = Decision::deny(
                        policy.rate,
                        inner.clock.now() as i64 + retry_after as i64,
                        retry_after,
                    );
                    return Ok(reject(req, &decision, DENY_MESSAGE));
                }
            }

            let decision = inner
                .limiter
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
                policy = %inner.limiter.policy().name,
                retry_after = ?decision.retry_after,
                "Rate limit exceeded"
            );

            if let Some(block_secs) = inner.limiter.policy().block_duration_secs {
                let key = block_key(inner.limiter.policy(), &identifier);
                inner
                    .store
                    .set(&key, "1", Duration::from_secs(block_secs))
                    .await
                    .map_err(store_error)?;
            }

            Ok(reject(req, &decision, DENY_MESSAGE))
        })
    }
}

fn store_error(err: gatekeeper_core::StoreError) -> Error {
    AppError::from(gatekeeper_core::RateLimitError::from(err)).into()
}

fn block_key(policy: &RateLimitPolicy, identifier: &str) -> String {
    format!("block:{}:{}", policy.name, identifier)
}

/// Attach quota headers to a passing response.
pub(crate) fn annotate<B>(res: &mut ServiceResponse<B>, decision: &Decision) {
    let headers = res.headers_mut();
    for (name, value) in [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.reset_at.to_string()),
    ] {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}

/// Build the 429 rejection for a denied decision.
pub(crate) fn reject<B>(
    req: ServiceRequest,
    decision: &Decision,
    message: &str,
) -> ServiceResponse<EitherBody<B>> {
    let retry_after = decision.retry_after.unwrap_or(1);

    let response = HttpResponse::TooManyRequests()
        .insert_header(("X-RateLimit-Limit", decision.limit.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .insert_header(("X-RateLimit-Reset", decision.reset_at.to_string()))
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ErrorResponse::rate_limited(message, retry_after));

    req.into_response(response).map_into_right_body()
}
