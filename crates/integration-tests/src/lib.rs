//! Integration test helpers for the meal orders service.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests (no database needed)
//! cargo test -p meal-orders-integration-tests
//!
//! # Database tests (each gets a fresh, migrated database)
//! DATABASE_URL=postgres://localhost/meal_orders_test \
//!     cargo test -p meal-orders-integration-tests -- --include-ignored
//! ```
//!
//! Requests are sent straight to the router with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, header};
use meal_orders_core::{Meal, default_catalog};
use meal_orders_server::config::{SentryConfig, ServerConfig};
use meal_orders_server::db::MealRepository;
use meal_orders_server::{AppState, app};
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

/// An address nothing listens on.
const UNREACHABLE_DATABASE_URL: &str = "postgres://orders@127.0.0.1:1/orders";

/// Build a test `ServerConfig` with safe defaults.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from(UNREACHABLE_DATABASE_URL),
        host: [127, 0, 0, 1].into(),
        port: 0,
        db_max_connections: 2,
        listing_cache_ttl: Duration::from_secs(60),
        sentry: SentryConfig::default(),
    }
}

/// Build the application router on top of `pool`.
#[must_use]
pub fn build_test_app(pool: PgPool) -> Router {
    app(AppState::new(test_config(), pool))
}

/// Build the router on a pool that never connects.
///
/// Every store call fails quickly, which exercises the paths that must not
/// need the database (validation, form controls, liveness) and the
/// store-failure paths.
#[must_use]
pub fn build_offline_app() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy(UNREACHABLE_DATABASE_URL)
        .unwrap();
    build_test_app(pool)
}

/// Seed the built-in catalog and return it as stored, ordered by name.
pub async fn seed_catalog(pool: &PgPool) -> Vec<Meal> {
    let repo = MealRepository::new(pool);
    repo.insert_many(&default_catalog()).await.unwrap();
    repo.list_by_name().await.unwrap()
}

/// Find a seeded meal by name.
#[must_use]
pub fn meal<'a>(meals: &'a [Meal], name: &str) -> &'a Meal {
    meals.iter().find(|m| m.name == name).unwrap()
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a urlencoded form body, as HTMX does.
pub async fn post_form(app: Router, uri: &str, body: &str, htmx: bool) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if htmx {
        request = request.header("HX-Request", "true");
    }

    app.oneshot(request.body(Body::from(body.to_owned())).unwrap())
        .await
        .unwrap()
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read the response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
