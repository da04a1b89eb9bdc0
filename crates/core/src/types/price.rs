//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10,2)` and handled as [`Decimal`] so totals
//! never pick up binary floating-point drift (`24.49 * 2 + 21.99` is exactly
//! `70.97`).

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount has fractions of a cent.
    #[error("price cannot have more than 2 decimal places (got {0})")]
    TooPrecise(Decimal),
    /// The amount does not fit `NUMERIC(10,2)`.
    #[error("price cannot exceed 99999999.99 (got {0})")]
    TooLarge(Decimal),
    /// The input string is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// Largest storable price, in cents.
const MAX_CENTS: i64 = 9_999_999_999;

/// A non-negative amount of money in the restaurant's currency (USD).
///
/// ## Examples
///
/// ```
/// use meal_orders_core::{Price, Quantity};
///
/// let nigiri: Price = "24.49".parse().unwrap();
/// let two = Quantity::new(2).unwrap();
///
/// assert_eq!(nigiri.times(two).to_string(), "$48.98");
/// assert!("-1.00".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount in dollars.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero,
    /// [`PriceError::TooPrecise`] if it has fractions of a cent, or
    /// [`PriceError::TooLarge`] if it exceeds `99999999.99`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise(amount));
        }
        if amount > Decimal::new(MAX_CENTS, 2) {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero, or
    /// [`PriceError::TooLarge`] if it exceeds the storable maximum.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The amount in dollars.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The price of `quantity` units at this price.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0 * Decimal::from(quantity.get()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| PriceError::Invalid(e.to_string()))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rejects_negative() {
        let result = Price::new(Decimal::new(-1, 2));
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_price_accepts_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
        assert_eq!("-0".parse::<Price>().unwrap().amount(), Decimal::ZERO);
    }

    #[test]
    fn test_price_rejects_fractional_cents() {
        assert!(matches!(
            "1.005".parse::<Price>(),
            Err(PriceError::TooPrecise(_))
        ));
        assert_eq!("24.490".parse::<Price>().unwrap().to_string(), "$24.49");
    }

    #[test]
    fn test_price_rejects_amount_beyond_storage() {
        assert!(matches!(
            "123456789.00".parse::<Price>(),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(
            Price::from_cents(MAX_CENTS + 1),
            Err(PriceError::TooLarge(_))
        ));
        assert_eq!(
            Price::from_cents(MAX_CENTS).unwrap().to_string(),
            "$99999999.99"
        );
    }

    #[test]
    fn test_price_parse_invalid() {
        assert!(matches!(
            "twelve".parse::<Price>(),
            Err(PriceError::Invalid(_))
        ));
    }

    #[test]
    fn test_price_display_two_decimals() {
        assert_eq!(Price::from_cents(2449).unwrap().to_string(), "$24.49");
        assert_eq!("7".parse::<Price>().unwrap().to_string(), "$7.00");
    }

    #[test]
    fn test_price_times_quantity() {
        let price: Price = "21.99".parse().unwrap();
        let total = price.times(Quantity::new(3).unwrap());
        assert_eq!(total.amount(), Decimal::new(6597, 2));
    }

    #[test]
    fn test_price_sum_is_exact() {
        let prices = ["0.10", "0.20", "0.30"].map(|p| p.parse::<Price>().unwrap());
        let total: Price = prices.iter().sum();
        assert_eq!(total.amount(), Decimal::new(60, 2));
    }

    #[test]
    fn test_price_serializes_as_string() {
        let price: Price = "22.99".parse().unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"22.99\"");

        let back: Price = serde_json::from_str("\"22.99\"").unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_price_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("\"-3.50\"").is_err());
    }
}
