//! Catalog listing command.

use tracing::info;

use meal_orders_server::db::{MealRepository, OrderRepository};

/// Log every stored meal, ordered by name, and the number of stored orders.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the query fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let meals = MealRepository::new(&pool).list_by_name().await?;

    info!("Meal catalog ({} meals)", meals.len());
    for meal in &meals {
        info!("  [{}] {}", meal.id, meal.option_label());
    }

    let orders = OrderRepository::new(&pool).count().await?;
    info!("Stored orders: {orders}");

    pool.close().await;
    Ok(())
}
