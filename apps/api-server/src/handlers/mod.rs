//! HTTP handlers and route configuration.

mod demo;
mod health;
mod limits;

use actix_web::web;

use gatekeeper_core::{AlgorithmKind, PolicyName, Scope};

use crate::middleware::rate_limit::RateLimit;
use crate::state::AppState;

/// Wire up all routes, with per-endpoint policies wrapped where the
/// endpoint warrants one.
pub fn configure_routes(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .route("/policies", web::get().to(limits::list_policies))
                .service(
                    web::scope("/auth")
                        .service(
                            web::resource("/login")
                                .wrap(RateLimit::new(
                                    &state,
                                    PolicyName::Login,
                                    Scope::Ip,
                                    AlgorithmKind::TokenBucket,
                                ))
                                .route(web::post().to(demo::login)),
                        )
                        .service(
                            web::resource("/register")
                                .wrap(RateLimit::new(
                                    &state,
                                    PolicyName::Register,
                                    Scope::Ip,
                                    AlgorithmKind::FixedWindow,
                                ))
                                .route(web::post().to(demo::register)),
                        ),
                )
                .service(
                    web::resource("/contact")
                        .wrap(RateLimit::new(
                            &state,
                            PolicyName::Contact,
                            Scope::Ip,
                            AlgorithmKind::SlidingWindow,
                        ))
                        .route(web::post().to(demo::contact)),
                )
                .service(
                    web::resource("/export")
                        .wrap(RateLimit::new(
                            &state,
                            PolicyName::Export,
                            Scope::User,
                            AlgorithmKind::TokenBucket,
                        ))
                        .route(web::post().to(demo::export)),
                ),
        );
    }
}
