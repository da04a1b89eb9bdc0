//! Meal Orders CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! meal-orders migrate
//!
//! # Seed the built-in catalog
//! meal-orders seed
//!
//! # Seed from a YAML file
//! meal-orders seed --file crates/cli/meals.yaml
//!
//! # Show the stored catalog
//! meal-orders meals
//!
//! # Change a meal's price (existing orders keep theirs)
//! meal-orders reprice --id 2 --price 22.49
//! ```
//!
//! # Environment Variables
//!
//! - `ORDERS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meal_orders_core::Price;

mod commands;

#[derive(Parser)]
#[command(name = "meal-orders")]
#[command(author, version, about = "Meal orders CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the meal catalog (skips meals that already exist)
    Seed {
        /// YAML file with `name` / `price` entries; the built-in catalog is used if omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List the meal catalog
    Meals,
    /// Change the price of a meal
    Reprice {
        /// Meal ID as shown by `meals`
        #[arg(long)]
        id: i32,
        /// New price in dollars, e.g. `22.49`
        #[arg(long)]
        price: Price,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::Meals => commands::meals::run().await?,
        Commands::Reprice { id, price } => commands::reprice::run(id, price).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reprice_parses_price() {
        let cli = Cli::try_parse_from(["meal-orders", "reprice", "--id", "2", "--price", "22.49"])
            .unwrap();
        match cli.command {
            Commands::Reprice { id, price } => {
                assert_eq!(id, 2);
                assert_eq!(price.to_string(), "$22.49");
            }
            _ => panic!("expected reprice"),
        }
    }

    #[test]
    fn test_reprice_rejects_unstorable_price() {
        for price in ["1.005", "123456789.00", "-1"] {
            let args = ["meal-orders", "reprice", "--id", "2", "--price", price];
            assert!(Cli::try_parse_from(args).is_err(), "{price} accepted");
        }
    }
}
