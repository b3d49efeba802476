//! Health check endpoint.

use actix_web::HttpResponse;
use serde::Serialize;

use gatekeeper_shared::ApiResponse;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    version: String,
    timestamp: String,
}

/// Liveness probe. Exempt from the global rate limit by default so load
/// balancers can poll freely.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};

    #[actix_web::test]
    async fn health_reports_ok() {
        let app = test::init_service(
            App::new().route("/api/health", web::get().to(health_check)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
    }
}
