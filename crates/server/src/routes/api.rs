//! JSON API handlers.
//!
//! Request and response bodies use camelCase field names. Validation failures
//! come back as `422` with `{ "errors": [{ "field", "message" }] }`.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use meal_orders_core::{
    DraftEntry, Meal, MealId, Order, OrderDetail, OrderDraft, OrderId, OrderLineItem,
    OrderLineItemId, PricedLine, Price, UNSELECTED_MEAL,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /api/orders`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub meals: Vec<MealSelection>,
}

/// One requested `(meal, quantity)` pair.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSelection {
    #[serde(default)]
    pub meal_id: i32,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

impl From<&CreateOrderRequest> for OrderDraft {
    fn from(request: &CreateOrderRequest) -> Self {
        Self::from_entries(
            request
                .meals
                .iter()
                .map(|selection| DraftEntry {
                    meal_id: selection.meal_id.max(UNSELECTED_MEAL),
                    quantity: selection.quantity,
                })
                .collect(),
        )
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// A catalog entry.
#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: MealId,
    pub name: String,
    pub price: Price,
}

impl From<&Meal> for MealResponse {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id,
            name: meal.name.clone(),
            price: meal.price,
        }
    }
}

/// A freshly created order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrderResponse {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<OrderLineItem>,
    pub total: Price,
}

impl From<Order> for CreatedOrderResponse {
    fn from(order: Order) -> Self {
        let total = order.total();
        Self {
            id: order.id,
            created_at: order.created_at,
            line_items: order.line_items,
            total,
        }
    }
}

/// One line of a listed order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub id: OrderLineItemId,
    pub meal_id: MealId,
    pub meal_name: String,
    pub quantity: i32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// A listed order with its lines and total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineResponse>,
    pub item_count: i64,
    pub total: Price,
}

impl From<&OrderDetail> for OrderResponse {
    fn from(order: &OrderDetail) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            lines: order
                .lines
                .iter()
                .map(|line| OrderLineResponse {
                    id: line.item.id,
                    meal_id: line.item.meal_id,
                    meal_name: line.meal_name.clone(),
                    quantity: line.item.quantity.get(),
                    unit_price: line.item.unit_price,
                    line_total: line.line_total(),
                })
                .collect(),
            item_count: order.item_count(),
            total: order.total(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List the meal catalog, ordered by name.
#[instrument(skip(state))]
pub async fn list_meals(State(state): State<AppState>) -> Result<Json<Vec<MealResponse>>, AppError> {
    let meals = state.orders().list_meals().await?;
    Ok(Json(meals.iter().map(MealResponse::from).collect()))
}

/// List every order, newest first.
#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state.orders().list_orders().await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// Create an order.
#[instrument(skip_all, fields(lines = request.meals.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreatedOrderResponse>), AppError> {
    let draft = OrderDraft::from(&request);
    let order = state.orders().submit(&draft).await?;
    Ok((StatusCode::CREATED, Json(CreatedOrderResponse::from(order))))
}
