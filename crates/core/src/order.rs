//! Orders, line items and the order total calculator.
//!
//! Every line item carries the unit price of its meal at the moment the order
//! was placed. Totals are computed from that snapshot, so re-pricing a meal
//! never changes the total of an order that already exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MealId, OrderId, OrderLineItemId, Price, Quantity};

/// Anything that contributes `unit price × quantity` to an order total.
pub trait PricedLine {
    /// Price of a single unit.
    fn unit_price(&self) -> Price;

    /// Number of units.
    fn quantity(&self) -> Quantity;

    /// `unit_price × quantity`.
    fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity())
    }
}

/// Sum of the line totals.
///
/// Addition of decimals is exact, so the result does not depend on the order
/// of the lines.
///
/// ```
/// use meal_orders_core::{Quantity, order::{order_total, PricedLine}, Price};
///
/// struct Line(Price, Quantity);
///
/// impl PricedLine for Line {
///     fn unit_price(&self) -> Price { self.0 }
///     fn quantity(&self) -> Quantity { self.1 }
/// }
///
/// let lines = [
///     Line("24.49".parse().unwrap(), Quantity::new(2).unwrap()),
///     Line("21.99".parse().unwrap(), Quantity::new(1).unwrap()),
/// ];
/// assert_eq!(order_total(&lines).to_string(), "$70.97");
/// ```
pub fn order_total<'a, L, I>(lines: I) -> Price
where
    L: PricedLine + 'a,
    I: IntoIterator<Item = &'a L>,
{
    lines.into_iter().map(PricedLine::line_total).sum()
}

/// One validated `(meal, quantity)` pair, ready to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    /// Meal being ordered.
    pub meal_id: MealId,
    /// Units of the meal.
    pub quantity: Quantity,
}

/// A stored line item (without meal details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    /// Unique line item ID.
    pub id: OrderLineItemId,
    /// Meal that was ordered.
    pub meal_id: MealId,
    /// Units ordered.
    pub quantity: Quantity,
    /// Meal price when the order was placed.
    pub unit_price: Price,
}

impl PricedLine for OrderLineItem {
    fn unit_price(&self) -> Price {
        self.unit_price
    }

    fn quantity(&self) -> Quantity {
        self.quantity
    }
}

/// A stored order, as returned by the create operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Line items in the order they were submitted.
    pub line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Total price of the order.
    #[must_use]
    pub fn total(&self) -> Price {
        order_total(&self.line_items)
    }
}

/// A line item joined with its meal, for the listing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDetail {
    /// The stored line item.
    #[serde(flatten)]
    pub item: OrderLineItem,
    /// Name of the ordered meal.
    pub meal_name: String,
}

impl PricedLine for OrderLineDetail {
    fn unit_price(&self) -> Price {
        self.item.unit_price
    }

    fn quantity(&self) -> Quantity {
        self.item.quantity
    }
}

/// An order with its lines joined to meal names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    /// Unique order ID.
    pub id: OrderId,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Lines in insertion order.
    pub lines: Vec<OrderLineDetail>,
}

impl OrderDetail {
    /// Total price of the order.
    #[must_use]
    pub fn total(&self) -> Price {
        order_total(&self.lines)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines
            .iter()
            .map(|line| i64::from(line.item.quantity.get()))
            .sum()
    }
}
