//! Business logic services.
//!
//! # Services
//!
//! - `orders` - Listing (cached) and submission of orders

pub mod orders;

pub use orders::{OrderService, SubmitError};
