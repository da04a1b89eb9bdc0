//! Catalog of meals.

use serde::{Deserialize, Serialize};

use crate::types::{MealId, Price};

/// Errors that can occur when validating a [`NewMeal`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MealError {
    /// The name is empty or only whitespace.
    #[error("meal name cannot be empty")]
    EmptyName,
    /// The name is longer than the catalog allows.
    #[error("meal name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A meal in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Unique meal ID.
    pub id: MealId,
    /// Display name, unique across the catalog.
    pub name: String,
    /// Current price.
    pub price: Price,
}

impl Meal {
    /// Label used for the meal picker, e.g. `Tuna Roll - $21.99`.
    #[must_use]
    pub fn option_label(&self) -> String {
        format!("{} - {}", self.name, self.price)
    }
}

/// A meal that has not been stored yet (seed input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeal {
    /// Display name.
    pub name: String,
    /// Price in dollars.
    pub price: Price,
}

impl NewMeal {
    /// Maximum length of a meal name.
    pub const MAX_NAME_LENGTH: usize = 120;

    /// Create a seed entry, trimming the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or longer than
    /// [`NewMeal::MAX_NAME_LENGTH`].
    pub fn new(name: &str, price: Price) -> Result<Self, MealError> {
        let meal = Self {
            name: name.trim().to_owned(),
            price,
        };
        meal.validate()?;
        Ok(meal)
    }

    /// Check the name constraints. Prices are already non-negative by type.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or too long.
    pub fn validate(&self) -> Result<(), MealError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(MealError::EmptyName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(MealError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }
        Ok(())
    }
}

/// The catalog the restaurant opens with.
///
/// Seeding this list twice leaves the catalog unchanged because meal names
/// are unique.
#[must_use]
pub fn default_catalog() -> Vec<NewMeal> {
    [
        ("Salmon Nigiri", 2449),
        ("Tuna Roll", 2199),
        ("Eel Avocado", 2299),
        ("California Roll", 2349),
    ]
    .into_iter()
    .filter_map(|(name, cents)| {
        let price = Price::from_cents(cents).ok()?;
        NewMeal::new(name, price).ok()
    })
    .collect()
}
