//! Database operations for the meal orders `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `meals` - Catalog; names are unique
//! - `orders` - One row per placed order
//! - `order_line_items` - `(meal, quantity, unit_price)` rows of an order
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p meal-orders-cli -- migrate
//! ```

pub mod meals;
pub mod orders;

use std::time::Duration;

use meal_orders_core::{MealError, MealId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use meals::{MealRepository, SeedReport};
pub use orders::OrderRepository;

/// Errors that can occur while reading or writing the store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A line item references a meal that does not exist.
    #[error("unknown meal: {0}")]
    UnknownMeal(MealId),

    /// An order was submitted with no line items.
    #[error("order has no line items")]
    EmptyOrder,

    /// A meal was rejected before any write.
    #[error("invalid meal {name:?}: {source}")]
    InvalidMeal {
        name: String,
        #[source]
        source: MealError,
    },

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(max_connections.min(2))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
