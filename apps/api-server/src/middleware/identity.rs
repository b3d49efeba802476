//! Rate limit identifier resolution.
//!
//! Pure functions over request metadata; nothing here touches the counter
//! store.

use actix_web::HttpMessage;
use actix_web::dev::ServiceRequest;

use gatekeeper_core::Scope;

/// Authenticated principal, inserted into request extensions by the
/// upstream authentication layer when a bearer token validates.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: uuid::Uuid,
}

/// Client IP: first address in the X-Forwarded-For chain when present,
/// otherwise the direct connection address.
pub fn client_ip(req: &ServiceRequest) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(chain) = forwarded.to_str() {
            if let Some(first) = chain.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    req.connection_info()
        .peer_addr()
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Derive the rate limit identifier for a request.
///
/// Anonymous requests under `User` or `IpUser` scopes fall back to the IP
/// identifier; being unauthenticated is never grounds for denial.
pub fn resolve(req: &ServiceRequest, scope: Scope) -> String {
    let principal = req.extensions().get::<Principal>().cloned();

    match (scope, principal) {
        (Scope::User, Some(p)) => format!("user:{}", p.user_id),
        (Scope::IpUser, Some(p)) => format!("user:{}:ip:{}", p.user_id, client_ip(req)),
        _ => format!("ip:{}", client_ip(req)),
    }
}
