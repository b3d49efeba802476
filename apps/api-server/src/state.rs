//! Application state - shared across all handlers and middleware.

use std::sync::Arc;

use gatekeeper_core::ports::{Clock, CounterStore, RateLimiter};
use gatekeeper_infra::clock::SystemClock;
use gatekeeper_infra::limiters;
use gatekeeper_infra::store::InMemoryCounterStore;

#[cfg(feature = "redis")]
use gatekeeper_infra::store::{RedisConfig, RedisCounterStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CounterStore>,
    pub clock: Arc<dyn Clock>,
    pub global_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let store = Self::build_store(config).await;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let global_limiter = limiters::build(
            config.global_limit.algorithm,
            store.clone(),
            clock.clone(),
            config.global_limit.policy.clone(),
        );

        tracing::info!("Application state initialized");

        Self {
            store,
            clock,
            global_limiter,
        }
    }

    #[cfg(feature = "redis")]
    async fn build_store(config: &AppConfig) -> Arc<dyn CounterStore> {
        if let Some(url) = &config.redis_url {
            let redis_config = RedisConfig {
                url: url.clone(),
                ..RedisConfig::from_env()
            };
            match RedisCounterStore::new(redis_config).await {
                Ok(store) => return Arc::new(store),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to Redis: {}. Using in-memory counters.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("REDIS_URL not set. Counters are per-process and lost on restart.");
        }
        Arc::new(InMemoryCounterStore::new())
    }

    #[cfg(not(feature = "redis"))]
    async fn build_store(_config: &AppConfig) -> Arc<dyn CounterStore> {
        tracing::info!("Running without redis feature - using in-memory counters");
        Arc::new(InMemoryCounterStore::new())
    }
}
