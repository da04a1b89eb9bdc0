//! Database migration command.
//!
//! Applies the migrations in `crates/server/migrations/`. Migrations are never
//! run by the server on startup.

use tracing::info;

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;
    info!("Migrations complete!");

    pool.close().await;
    Ok(())
}
