//! Meal Orders Core - Shared domain types and rules.
//!
//! This crate provides the types used by every component of the service:
//! - `server` - Listing page, order form and JSON API
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Order validation and total computation live here
//! so they can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and quantities
//! - [`catalog`] - Meals and seed entries
//! - [`order`] - Persisted orders, line items and the total calculator
//! - [`draft`] - Order form state, controls and validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod draft;
pub mod order;
pub mod types;

pub use catalog::{Meal, MealError, NewMeal, default_catalog};
pub use draft::{
    DraftAction, DraftEntry, Field, FieldError, FieldErrorKind, OrderDraft, UNSELECTED_MEAL,
    ValidationErrors,
};
pub use order::{
    NewOrderLine, Order, OrderDetail, OrderLineDetail, OrderLineItem, PricedLine, order_total,
};
pub use types::*;
