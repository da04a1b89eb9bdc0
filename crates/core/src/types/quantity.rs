//! Line item quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    BelowMinimum(i64),
    /// The value does not fit the storage column.
    #[error("quantity is too large (got {0})")]
    TooLarge(i64),
}

/// A positive number of units of one meal.
///
/// Quantities are never below [`Quantity::MIN`]. The form's minus control
/// uses [`Quantity::decrement`], which stops at the minimum instead of
/// failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// The smallest allowed quantity.
    pub const MIN: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is below 1 or does not fit in an `i32`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::BelowMinimum(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge(value))
    }

    /// The underlying value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// One more unit. Saturates at `i32::MAX`.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One fewer unit, never going below [`Quantity::MIN`].
    #[must_use]
    pub const fn decrement(self) -> Self {
        if self.0 > Self::MIN.0 {
            Self(self.0 - 1)
        } else {
            Self::MIN
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_quantity_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::BelowMinimum(0)));
        assert_eq!(Quantity::new(-4), Err(QuantityError::BelowMinimum(-4)));
    }

    #[test]
    fn test_quantity_rejects_overflow() {
        let too_big = i64::from(i32::MAX) + 1;
        assert_eq!(Quantity::new(too_big), Err(QuantityError::TooLarge(too_big)));
    }

    #[test]
    fn test_decrement_at_minimum_is_noop() {
        assert_eq!(Quantity::MIN.decrement(), Quantity::MIN);
    }

    #[test]
    fn test_increment_then_decrement() {
        let q = Quantity::new(3).unwrap();
        assert_eq!(q.increment().get(), 4);
        assert_eq!(q.decrement().get(), 2);
    }

    #[test]
    fn test_quantity_deserialize_validates() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("5").unwrap().get(), 5);
    }

    proptest! {
        #[test]
        fn prop_decrement_never_below_one(start in 1i64..1_000, steps in 0usize..2_000) {
            let mut q = Quantity::new(start).unwrap();
            for _ in 0..steps {
                q = q.decrement();
            }
            prop_assert!(q.get() >= 1);
        }
    }
}
