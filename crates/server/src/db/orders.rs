//! Order repository.
//!
//! An order and its line items are written in a single transaction. Each
//! line item copies the current meal price into `unit_price`, so later
//! re-pricing never changes the total of a stored order.

use chrono::{DateTime, Utc};
use meal_orders_core::{
    MealId, NewOrderLine, Order, OrderDetail, OrderId, OrderLineDetail, OrderLineItem,
    OrderLineItemId, Price, Quantity,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::PersistenceError;

/// Raw `order_line_items` row as returned by an insert.
#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: i32,
    meal_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<LineItemRow> for OrderLineItem {
    type Error = PersistenceError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderLineItemId::new(row.id),
            meal_id: MealId::new(row.meal_id),
            quantity: Quantity::try_from(row.quantity).map_err(|e| {
                PersistenceError::DataCorruption(format!("line item {}: {e}", row.id))
            })?,
            unit_price: Price::new(row.unit_price).map_err(|e| {
                PersistenceError::DataCorruption(format!("line item {}: {e}", row.id))
            })?,
        })
    }
}

/// One row of the listing join: an order with one of its lines.
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    order_id: i32,
    created_at: DateTime<Utc>,
    line_id: i32,
    meal_id: i32,
    meal_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl ListingRow {
    fn into_line(self) -> Result<OrderLineDetail, PersistenceError> {
        let item = OrderLineItem::try_from(LineItemRow {
            id: self.line_id,
            meal_id: self.meal_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
        })?;
        Ok(OrderLineDetail {
            item,
            meal_name: self.meal_name,
        })
    }
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store an order with its line items.
    ///
    /// Either the order and every line item are written, or nothing is.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EmptyOrder` if `lines` is empty.
    /// Returns `PersistenceError::UnknownMeal` if a line references a missing meal.
    /// Returns `PersistenceError::Database` if a statement fails.
    pub async fn create(&self, lines: &[NewOrderLine]) -> Result<Order, PersistenceError> {
        if lines.is_empty() {
            return Err(PersistenceError::EmptyOrder);
        }

        let mut tx = self.pool.begin().await?;

        let (id, created_at): (i32, DateTime<Utc>) =
            sqlx::query_as("INSERT INTO orders DEFAULT VALUES RETURNING id, created_at")
                .fetch_one(&mut *tx)
                .await?;

        let mut line_items = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, LineItemRow>(
                r"
                INSERT INTO order_line_items (order_id, meal_id, quantity, unit_price)
                SELECT $1, m.id, $3, m.price
                FROM meals m
                WHERE m.id = $2
                RETURNING id, meal_id, quantity, unit_price
                ",
            )
            .bind(id)
            .bind(line.meal_id.as_i32())
            .bind(line.quantity.get())
            .fetch_optional(&mut *tx)
            .await?;

            // Dropping `tx` without commit rolls the order back.
            let row = row.ok_or(PersistenceError::UnknownMeal(line.meal_id))?;
            line_items.push(OrderLineItem::try_from(row)?);
        }

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(id),
            created_at,
            line_items,
        })
    }

    /// Every order with its lines and meal names, newest first.
    ///
    /// Lines keep insertion order within each order.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Database` if the query fails.
    /// Returns `PersistenceError::DataCorruption` if a stored value is invalid.
    pub async fn list_details(&self) -> Result<Vec<OrderDetail>, PersistenceError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r"
            SELECT o.id AS order_id,
                   o.created_at,
                   li.id AS line_id,
                   li.meal_id,
                   m.name AS meal_name,
                   li.quantity,
                   li.unit_price
            FROM orders o
            JOIN order_line_items li ON li.order_id = o.id
            JOIN meals m ON m.id = li.meal_id
            ORDER BY o.created_at DESC, o.id DESC, li.id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        group_rows(rows)
    }

    /// Number of stored orders.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, PersistenceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Fold consecutive rows of the same order into one [`OrderDetail`].
fn group_rows(rows: Vec<ListingRow>) -> Result<Vec<OrderDetail>, PersistenceError> {
    let mut orders: Vec<OrderDetail> = Vec::new();

    for row in rows {
        let order_id = OrderId::new(row.order_id);
        let created_at = row.created_at;
        let line = row.into_line()?;

        if let Some(current) = orders.last_mut().filter(|o| o.id == order_id) {
            current.lines.push(line);
        } else {
            orders.push(OrderDetail {
                id: order_id,
                created_at,
                lines: vec![line],
            });
        }
    }

    Ok(orders)
}
