//! Stand-in handlers for the protected endpoints.
//!
//! The real login, registration, contact, and export logic lives in the
//! host application. These routes give the policy wiring a surface to
//! protect and the middleware tests something to hit.

use actix_web::HttpResponse;
use serde_json::json;

use gatekeeper_shared::ApiResponse;

pub async fn login() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(json!({ "endpoint": "login" })))
}

pub async fn register() -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::ok(json!({ "endpoint": "register" })))
}

pub async fn contact() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok_with_message(
        json!({ "endpoint": "contact" }),
        "Message received",
    ))
}

pub async fn export() -> HttpResponse {
    HttpResponse::Accepted().json(ApiResponse::ok(json!({ "endpoint": "export" })))
}
