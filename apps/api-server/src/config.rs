//! Application configuration loaded from environment variables.

use std::env;

use gatekeeper_core::{AlgorithmKind, RateLimitPolicy};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub global_limit: GlobalLimitConfig,
}

/// Catch-all rate limiter configuration.
#[derive(Debug, Clone)]
pub struct GlobalLimitConfig {
    pub enabled: bool,
    /// Algorithm backing the catch-all limiter; unrecognized names fall
    /// back to the token bucket.
    pub algorithm: AlgorithmKind,
    /// Policy backing the catch-all limiter; unrecognized names fall back
    /// to the default policy.
    pub policy: RateLimitPolicy,
    /// Requests whose path starts with one of these prefixes bypass the
    /// global limiter (health checks, static assets).
    pub skip_paths: Vec<String>,
}

impl Default for GlobalLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: AlgorithmKind::TokenBucket,
            policy: RateLimitPolicy::global(),
            skip_paths: ["/api/health", "/static", "/media", "/admin"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let global_limit = GlobalLimitConfig {
            enabled: env::var("GLOBAL_RATE_LIMIT_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            algorithm: AlgorithmKind::resolve(
                &env::var("GLOBAL_RATE_LIMIT_ALGORITHM").unwrap_or_default(),
            ),
            policy: RateLimitPolicy::resolve(
                &env::var("GLOBAL_RATE_LIMIT_POLICY").unwrap_or_else(|_| "global".to_string()),
            ),
            skip_paths: env::var("GLOBAL_RATE_LIMIT_SKIP_PATHS")
                .map(|v| {
                    v.split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| GlobalLimitConfig::default().skip_paths),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            redis_url: env::var("REDIS_URL").ok(),
            global_limit,
        }
    }
}
