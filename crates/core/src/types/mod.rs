//! Value types for the meal orders domain.
//!
//! This module provides type-safe wrappers for identifiers, money and
//! quantities.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
