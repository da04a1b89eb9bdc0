//! Seed the meal catalog.
//!
//! Without `--file` the built-in catalog is used. A seed file is a YAML list:
//!
//! ```yaml
//! - name: Salmon Nigiri
//!   price: "24.49"
//! - name: Tuna Roll
//!   price: "21.99"
//! ```
//!
//! Every entry is validated before connecting to the database. Meals whose
//! name already exists are skipped, so seeding twice is harmless.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use meal_orders_core::{NewMeal, Price, default_catalog};
use meal_orders_server::db::MealRepository;

/// One entry of a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedEntry {
    pub name: String,
    pub price: String,
}

/// A seed file entry that cannot be stored.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("entry {index} ({name:?}): {reason}")]
pub struct SeedEntryError {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Turn parsed entries into meals, collecting every invalid entry.
///
/// # Errors
///
/// Returns all entries with an empty name or an invalid price.
pub fn validate_entries(entries: &[SeedEntry]) -> Result<Vec<NewMeal>, Vec<SeedEntryError>> {
    let mut meals = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let meal = entry
            .price
            .trim()
            .parse::<Price>()
            .map_err(|e| e.to_string())
            .and_then(|price| NewMeal::new(&entry.name, price).map_err(|e| e.to_string()));

        match meal {
            Ok(meal) => meals.push(meal),
            Err(reason) => errors.push(SeedEntryError {
                index,
                name: entry.name.clone(),
                reason,
            }),
        }
    }

    if errors.is_empty() {
        Ok(meals)
    } else {
        Err(errors)
    }
}

/// Parse and validate a seed file's contents.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or any entry is invalid.
pub fn parse_seed_file(content: &str) -> Result<Vec<NewMeal>, Box<dyn std::error::Error>> {
    let entries: Vec<SeedEntry> = serde_yaml::from_str(content)?;
    info!(entries = entries.len(), "Parsed seed file");

    validate_entries(&entries).map_err(|errors| {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        format!("{} validation errors found", errors.len()).into()
    })
}

/// Seed the catalog from `file`, or the built-in catalog if `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, the database is
/// unreachable, or an insert fails.
pub async fn run(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    // Read and validate before connecting to database
    let meals = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading meals from file");
            let content = tokio::fs::read_to_string(path).await?;
            parse_seed_file(&content)?
        }
        None => default_catalog(),
    };

    info!(meals = meals.len(), "Seed entries validated");

    let pool = super::connect().await?;
    let report = MealRepository::new(&pool).insert_many(&meals).await?;

    info!("Seeding complete!");
    info!("  Meals inserted: {}", report.inserted);
    info!("  Meals skipped (already exist): {}", report.skipped);

    pool.close().await;
    Ok(())
}
