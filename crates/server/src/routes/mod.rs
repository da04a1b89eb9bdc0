//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                 - Order listing page
//! GET  /health           - Liveness check
//! GET  /health/ready     - Readiness check (database)
//!
//! # Order form (HTMX fragments)
//! GET  /orders/new       - Form with one empty entry
//! POST /orders/form      - Apply a control (op=add|remove:i|inc:i|dec:i), re-render
//! POST /orders           - Submit; HX-Redirect / 303 to / on success
//!
//! # JSON API
//! GET  /api/meals        - Meal catalog
//! GET  /api/orders       - Orders with lines and totals
//! POST /api/orders       - Create an order
//!
//! # Anything else
//! *                      - 404 JSON body
//! ```

pub mod api;
pub mod health;
pub mod orders;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .merge(order_routes())
        .merge(api_routes())
        .merge(health_routes())
        .fallback(not_found)
}

/// Answer unmatched paths with a JSON 404.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Create the order form routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::submit))
        .route("/orders/new", get(orders::new_form))
        .route("/orders/form", post(orders::form_action))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/meals", get(api::list_meals))
        .route("/api/orders", get(api::list_orders).post(api::create_order))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
