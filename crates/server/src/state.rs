//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::ListingCache;
use crate::config::ServerConfig;
use crate::services::OrderService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    listing_cache: ListingCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let listing_cache = ListingCache::new(config.listing_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                listing_cache,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the listing cache.
    #[must_use]
    pub fn listing_cache(&self) -> &ListingCache {
        &self.inner.listing_cache
    }

    /// Order service bound to this state's pool and cache.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.pool(), self.listing_cache())
    }
}
