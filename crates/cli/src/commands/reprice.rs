//! Change a meal's catalog price.
//!
//! Stored orders keep the price they were placed at; only new orders see the
//! change.

use tracing::info;

use meal_orders_core::{MealId, Price};
use meal_orders_server::db::MealRepository;

/// Set the price of meal `id`.
///
/// # Errors
///
/// Returns an error if the meal does not exist or the database is unreachable.
pub async fn run(id: i32, price: Price) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    MealRepository::new(&pool)
        .update_price(MealId::new(id), price)
        .await?;

    info!(meal_id = id, price = %price, "Meal repriced");

    pool.close().await;
    Ok(())
}
