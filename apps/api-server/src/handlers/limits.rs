//! Policy table introspection.

use actix_web::HttpResponse;
use serde::Serialize;

use gatekeeper_core::{PolicyName, RateLimitPolicy};
use gatekeeper_shared::ApiResponse;

#[derive(Serialize)]
struct PolicyView {
    name: &'static str,
    rate: u32,
    interval_secs: u64,
    burst: u32,
}

/// List the configured per-endpoint policies.
pub async fn list_policies() -> HttpResponse {
    let policies: Vec<PolicyView> = PolicyName::all()
        .iter()
        .map(|name| {
            let policy = RateLimitPolicy::named(*name);
            PolicyView {
                name: name.as_str(),
                rate: policy.rate,
                interval_secs: policy.interval_secs,
                burst: policy.burst,
            }
        })
        .collect();

    HttpResponse::Ok().json(ApiResponse::ok(policies))
}
