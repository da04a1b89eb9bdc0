//! Meal catalog repository.

use meal_orders_core::{Meal, MealId, NewMeal, Price};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::PersistenceError;

/// Raw `meals` row.
#[derive(Debug, sqlx::FromRow)]
struct MealRow {
    id: i32,
    name: String,
    price: Decimal,
}

impl TryFrom<MealRow> for Meal {
    type Error = PersistenceError;

    fn try_from(row: MealRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            PersistenceError::DataCorruption(format!("invalid price for meal {}: {e}", row.id))
        })?;

        Ok(Self {
            id: MealId::new(row.id),
            name: row.name,
            price,
        })
    }
}

/// Outcome of seeding the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Meals written.
    pub inserted: u64,
    /// Meals skipped because a meal with the same name exists.
    pub skipped: u64,
}

/// Repository for meal catalog operations.
pub struct MealRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MealRepository<'a> {
    /// Create a new meal repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All meals, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Database` if the query fails.
    /// Returns `PersistenceError::DataCorruption` if a stored price is invalid.
    pub async fn list_by_name(&self) -> Result<Vec<Meal>, PersistenceError> {
        let rows = sqlx::query_as::<_, MealRow>(
            r"
            SELECT id, name, price
            FROM meals
            ORDER BY name ASC, id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Meal::try_from).collect()
    }

    /// Insert seed meals, skipping names that already exist.
    ///
    /// All inserts run in one transaction, so a failure leaves the catalog
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidMeal` if an entry fails validation.
    /// Returns `PersistenceError::Database` if a statement fails.
    pub async fn insert_many(&self, meals: &[NewMeal]) -> Result<SeedReport, PersistenceError> {
        for meal in meals {
            meal.validate()
                .map_err(|source| PersistenceError::InvalidMeal {
                    name: meal.name.clone(),
                    source,
                })?;
        }

        let mut tx = self.pool.begin().await?;
        let mut report = SeedReport::default();

        for meal in meals {
            let result = sqlx::query(
                r"
                INSERT INTO meals (name, price)
                VALUES ($1, $2)
                ON CONFLICT (name) DO NOTHING
                ",
            )
            .bind(meal.name.trim())
            .bind(meal.price.amount())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                report.skipped += 1;
            } else {
                report.inserted += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "Seeded meal catalog"
        );

        Ok(report)
    }

    /// Change the price of a meal. Existing orders keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UnknownMeal` if the meal does not exist.
    /// Returns `PersistenceError::Database` if the update fails.
    pub async fn update_price(&self, id: MealId, price: Price) -> Result<(), PersistenceError> {
        let result = sqlx::query("UPDATE meals SET price = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(price.amount())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::UnknownMeal(id));
        }
        Ok(())
    }
}
