//! JSON API tests.
//!
//! Validation tests run without a database: invalid input must be rejected
//! before the store is touched. Tests marked `#[ignore]` need `DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use meal_orders_integration_tests::{
    body_json, build_offline_app, build_test_app, get, meal, post_json, seed_catalog,
};
use serde_json::json;
use sqlx::PgPool;

// =============================================================================
// Validation (no database)
// =============================================================================

#[tokio::test]
async fn test_create_empty_order_is_rejected() {
    let response = post_json(build_offline_app(), "/api/orders", &json!({ "meals": [] })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({ "errors": [{ "field": "meals", "message": "at least one required" }] })
    );
}

#[tokio::test]
async fn test_create_reports_every_invalid_field() {
    let response = post_json(
        build_offline_app(),
        "/api/orders",
        &json!({ "meals": [
            { "mealId": 0, "quantity": 0 },
            { "mealId": 2, "quantity": 1 },
            { "mealId": 3, "quantity": -1 },
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        ["meals[0].mealId", "meals[0].quantity", "meals[2].quantity"]
    );
    assert_eq!(body["errors"][1]["message"], "must be ≥ 1");
}

#[tokio::test]
async fn test_create_store_failure_is_generic_500() {
    let response = post_json(
        build_offline_app(),
        "/api/orders",
        &json!({ "meals": [{ "mealId": 1, "quantity": 1 }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Internal server error");
}

// =============================================================================
// Store round trips (database)
// =============================================================================

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_list_meals_by_name(pool: PgPool) {
    seed_catalog(&pool).await;

    let body = body_json(get(build_test_app(pool), "/api/meals").await).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["California Roll", "Eel Avocado", "Salmon Nigiri", "Tuna Roll"]
    );
    assert_eq!(body[0]["price"], "23.49");
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_create_then_list(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let nigiri = meal(&meals, "Salmon Nigiri").id;
    let tuna = meal(&meals, "Tuna Roll").id;
    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/orders",
        &json!({ "meals": [
            { "mealId": nigiri, "quantity": 2 },
            { "mealId": tuna, "quantity": 1 },
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["lineItems"].as_array().unwrap().len(), 2);
    assert_eq!(created["lineItems"][0]["mealId"], nigiri.as_i32());
    assert_eq!(created["lineItems"][0]["quantity"], 2);
    assert_eq!(created["total"], "70.97");

    let listed = body_json(get(app, "/api/orders").await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
    assert_eq!(listed[0]["lines"][0]["mealName"], "Salmon Nigiri");
    assert_eq!(listed[0]["lines"][0]["lineTotal"], "48.98");
    assert_eq!(listed[0]["lines"][1]["mealName"], "Tuna Roll");
    assert_eq!(listed[0]["total"], "70.97");
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_created_order_shows_up_despite_cached_listing(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let eel = meal(&meals, "Eel Avocado").id;
    let app = build_test_app(pool);

    // Warm the cache with an empty listing.
    let before = body_json(get(app.clone(), "/api/orders").await).await;
    assert!(before.as_array().unwrap().is_empty());

    let response = post_json(
        app.clone(),
        "/api/orders",
        &json!({ "meals": [{ "mealId": eel, "quantity": 1 }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let after = body_json(get(app, "/api/orders").await).await;
    assert_eq!(after.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../server/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unknown_meal_leaves_nothing_behind(pool: PgPool) {
    let meals = seed_catalog(&pool).await;
    let tuna = meal(&meals, "Tuna Roll").id;
    let app = build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/orders",
        &json!({ "meals": [
            { "mealId": tuna, "quantity": 1 },
            { "mealId": 9999, "quantity": 1 },
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let (orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_line_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((orders, lines), (0, 0));
}
