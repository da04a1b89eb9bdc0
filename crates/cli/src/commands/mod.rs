//! CLI subcommands.

pub mod meals;
pub mod migrate;
pub mod reprice;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

use meal_orders_server::db;

/// Pool size for one-shot CLI commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

/// Database URL from `ORDERS_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, &'static str> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    std::env::var("ORDERS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ORDERS_DATABASE_URL not set")
}

/// Connect to the orders database.
async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url, CLI_MAX_CONNECTIONS).await?;
    tracing::info!("Connected to database");
    Ok(pool)
}
