//! # Gatekeeper API Server
//!
//! Actix-web server wiring the rate-limiting middleware in front of the
//! application routes.

use actix_web::middleware::Condition;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::global::GlobalRateLimit;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&telemetry::TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Gatekeeper API server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await;
    let global = config.global_limit.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(
                global.enabled,
                GlobalRateLimit::new(&state, global.skip_paths.clone()),
            ))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes(state.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
