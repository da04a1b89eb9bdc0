//! Repository and service tests against a real database.
//!
//! Each test gets a fresh database with migrations applied by
//! `#[sqlx::test]`.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use meal_orders_core::{
    DraftEntry, MealId, NewMeal, NewOrderLine, OrderDraft, Price, Quantity, default_catalog,
};
use meal_orders_integration_tests::{meal, seed_catalog};
use meal_orders_server::cache::ListingCache;
use meal_orders_server::db::{MealRepository, OrderRepository, PersistenceError, SeedReport};
use meal_orders_server::services::{OrderService, SubmitError};
use sqlx::PgPool;

fn line(meal_id: MealId, quantity: i64) -> NewOrderLine {
    NewOrderLine {
        meal_id,
        quantity: Quantity::new(quantity).unwrap(),
    }
}

// =============================================================================
// Seeding
// =============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_seeding_twice_keeps_one_row_per_name(pool: PgPool) {
    let repo = MealRepository::new(&pool);

    let first = repo.insert_many(&default_catalog()).await.unwrap();
    assert_eq!(first, SeedReport { inserted: 4, skipped: 0 });

    let second = repo.insert_many(&default_catalog()).await.unwrap();
    assert_eq!(second, SeedReport { inserted: 0, skipped: 4 });

    assert_eq!(repo.list_by_name().await.unwrap().len(), 4);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_seeding_rejects_invalid_entry_before_writing(pool: PgPool) {
    let repo = MealRepository::new(&pool);
    let invalid = NewMeal {
        name: "   ".to_string(),
        price: Price::ZERO,
    };

    let err = repo
        .insert_many(&[default_catalog().remove(0), invalid])
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidMeal { .. }));
    assert!(repo.list_by_name().await.unwrap().is_empty());
}

// =============================================================================
// Orders
// =============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_create_keeps_lines_in_order(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let repo = OrderRepository::new(&pool);
    let lines = [
        line(meal(&meals, "Tuna Roll").id, 3),
        line(meal(&meals, "Eel Avocado").id, 1),
        line(meal(&meals, "Tuna Roll").id, 2),
    ];

    let order = repo.create(&lines).await.unwrap();

    assert_eq!(order.line_items.len(), lines.len());
    for (item, input) in order.line_items.iter().zip(&lines) {
        assert_eq!(item.meal_id, input.meal_id);
        assert_eq!(item.quantity, input.quantity);
    }
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_created_orders_get_unique_ids(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let repo = OrderRepository::new(&pool);
    let tuna = meal(&meals, "Tuna Roll").id;

    let first = repo.create(&[line(tuna, 1)]).await.unwrap();
    let second = repo.create(&[line(tuna, 1)]).await.unwrap();
    assert_ne!(first.id, second.id);

    // Newest first.
    let listed = repo.list_details().await.unwrap();
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_empty_order_is_rejected(pool: PgPool) {
    let err = OrderRepository::new(&pool).create(&[]).await.unwrap_err();
    assert!(matches!(err, PersistenceError::EmptyOrder));
    assert_eq!(OrderRepository::new(&pool).count().await.unwrap(), 0);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unknown_meal_rolls_back(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let repo = OrderRepository::new(&pool);

    let err = repo
        .create(&[line(meal(&meals, "Tuna Roll").id, 1), line(MealId::new(4242), 1)])
        .await
        .unwrap_err();

    assert!(matches!(err, PersistenceError::UnknownMeal(id) if id == MealId::new(4242)));
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_total_uses_price_at_order_time(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let nigiri = meal(&meals, "Salmon Nigiri").id;
    let orders = OrderRepository::new(&pool);

    orders.create(&[line(nigiri, 2)]).await.unwrap();
    MealRepository::new(&pool)
        .update_price(nigiri, Price::from_cents(9999).unwrap())
        .await
        .unwrap();

    let listed = orders.list_details().await.unwrap();
    assert_eq!(listed[0].total().to_string(), "$48.98");
}

// =============================================================================
// Service + cache
// =============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_submit_invalidates_cached_listing(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let cache = ListingCache::new(Duration::from_secs(600));
    let service = OrderService::new(&pool, &cache);

    assert!(service.list_orders().await.unwrap().is_empty());
    assert!(cache.orders().await.is_some());

    let draft = OrderDraft::from_entries(vec![DraftEntry {
        meal_id: meal(&meals, "California Roll").id.as_i32(),
        quantity: 1,
    }]);
    let order = service.submit(&draft).await.unwrap();

    let listed = service.list_orders().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, order.id);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_submit_invalid_draft_writes_nothing(pool: PgPool) {
    seed_catalog(&pool).await;
    let cache = ListingCache::new(Duration::from_secs(600));
    let service = OrderService::new(&pool, &cache);

    let err = service.submit(&OrderDraft::new()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Validation(_)));
    assert_eq!(OrderRepository::new(&pool).count().await.unwrap(), 0);
}
