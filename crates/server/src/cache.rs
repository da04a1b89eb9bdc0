//! In-memory cache for the order listing and the meal catalog.
//!
//! Entries live for a configurable TTL and are invalidated as soon as a new
//! order is stored. A generation counter guards against a slow reader putting
//! a listing that predates the invalidation back into the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use meal_orders_core::{Meal, OrderDetail};
use moka::future::Cache;
use tracing::debug;

/// Cache key for listings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ListingKey {
    Orders,
    Meals,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CachedListing {
    Orders(Arc<Vec<OrderDetail>>),
    Meals(Arc<Vec<Meal>>),
}

/// Listing cache shared by all handlers.
#[derive(Clone)]
pub struct ListingCache {
    cache: Cache<ListingKey, CachedListing>,
    generation: Arc<AtomicU64>,
}

impl ListingCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();

        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current order generation. Read it before loading orders from the
    /// store and hand it back to [`ListingCache::store_orders`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Cached order listing, if fresh.
    pub async fn orders(&self) -> Option<Arc<Vec<OrderDetail>>> {
        match self.cache.get(&ListingKey::Orders).await {
            Some(CachedListing::Orders(orders)) => {
                debug!("Cache hit for orders");
                Some(orders)
            }
            _ => None,
        }
    }

    /// Cache an order listing loaded at `generation`.
    ///
    /// The listing is dropped if an order was stored since `generation` was
    /// read.
    pub async fn store_orders(&self, generation: u64, orders: Arc<Vec<OrderDetail>>) {
        if self.generation() != generation {
            return;
        }
        self.cache
            .insert(ListingKey::Orders, CachedListing::Orders(orders))
            .await;

        // An invalidation may have raced the insert.
        if self.generation() != generation {
            self.cache.invalidate(&ListingKey::Orders).await;
        }
    }

    /// Cached meal catalog, if fresh.
    pub async fn meals(&self) -> Option<Arc<Vec<Meal>>> {
        match self.cache.get(&ListingKey::Meals).await {
            Some(CachedListing::Meals(meals)) => {
                debug!("Cache hit for meals");
                Some(meals)
            }
            _ => None,
        }
    }

    /// Cache the meal catalog.
    pub async fn store_meals(&self, meals: Arc<Vec<Meal>>) {
        self.cache
            .insert(ListingKey::Meals, CachedListing::Meals(meals))
            .await;
    }

    /// Drop the order listing after a new order is stored.
    pub async fn invalidate_orders(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate(&ListingKey::Orders).await;
    }
}
