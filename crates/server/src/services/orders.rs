//! Order service.
//!
//! Ties validation, persistence and the listing cache together. Handlers for
//! both the HTML form and the JSON API go through [`OrderService`].

use std::sync::Arc;

use meal_orders_core::{Meal, Order, OrderDetail, OrderDraft, ValidationErrors};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use crate::cache::ListingCache;
use crate::db::{MealRepository, OrderRepository, PersistenceError};

/// Errors that can occur when submitting an order.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The draft broke one or more rules; nothing was stored.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The store rejected or failed the write.
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    meals: MealRepository<'a>,
    cache: &'a ListingCache,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a ListingCache) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            meals: MealRepository::new(pool),
            cache,
        }
    }

    /// Every order with its lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the store cannot be read.
    pub async fn list_orders(&self) -> Result<Arc<Vec<OrderDetail>>, PersistenceError> {
        if let Some(orders) = self.cache.orders().await {
            return Ok(orders);
        }

        let generation = self.cache.generation();
        let orders = Arc::new(self.orders.list_details().await?);
        self.cache.store_orders(generation, Arc::clone(&orders)).await;
        Ok(orders)
    }

    /// The meal catalog, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the store cannot be read.
    pub async fn list_meals(&self) -> Result<Arc<Vec<Meal>>, PersistenceError> {
        if let Some(meals) = self.cache.meals().await {
            return Ok(meals);
        }

        let meals = Arc::new(self.meals.list_by_name().await?);
        self.cache.store_meals(Arc::clone(&meals)).await;
        Ok(meals)
    }

    /// Validate and store a draft.
    ///
    /// The draft is checked in full before anything touches the store. On
    /// success the cached order listing is dropped so the next read sees the
    /// new order.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Validation` with every violation if the draft is
    /// invalid, or `SubmitError::Persistence` if the write fails.
    #[instrument(skip_all, fields(lines = draft.entries().len()))]
    pub async fn submit(&self, draft: &OrderDraft) -> Result<Order, SubmitError> {
        let lines = draft.validate()?;
        let order = self.orders.create(&lines).await?;
        self.cache.invalidate_orders().await;

        info!(
            order_id = %order.id,
            line_items = order.line_items.len(),
            total = %order.total(),
            "Order created"
        );

        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use meal_orders_core::DraftEntry;
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap()
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_store() {
        let pool = unreachable_pool();
        let cache = ListingCache::new(Duration::from_secs(60));
        let service = OrderService::new(&pool, &cache);

        let draft = OrderDraft::from_entries(vec![DraftEntry {
            meal_id: 0,
            quantity: 0,
        }]);
        match service.submit(&draft).await {
            Err(SubmitError::Validation(errors)) => assert_eq!(errors.errors().len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_draft_is_validation_error() {
        let pool = unreachable_pool();
        let cache = ListingCache::new(Duration::from_secs(60));
        let service = OrderService::new(&pool, &cache);

        let err = service
            .submit(&OrderDraft::from_entries(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_persistence_error() {
        let pool = unreachable_pool();
        let cache = ListingCache::new(Duration::from_secs(60));
        let service = OrderService::new(&pool, &cache);

        let draft = OrderDraft::from_entries(vec![DraftEntry {
            meal_id: 1,
            quantity: 2,
        }]);
        let err = service.submit(&draft).await.unwrap_err();
        assert!(matches!(err, SubmitError::Persistence(_)));
    }
}
