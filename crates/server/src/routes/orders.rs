//! Order listing page and order form handlers.
//!
//! The form is server-driven. Every control (add, remove, plus, minus) posts
//! the whole draft together with an `op` value to `/orders/form`, which
//! applies it and re-renders the form fragment for HTMX to swap in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use meal_orders_core::{
    DraftAction, DraftEntry, Meal, OrderDetail, OrderDraft, PricedLine, Price, UNSELECTED_MEAL,
    ValidationErrors,
};
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::services::SubmitError;
use crate::state::AppState;

/// Banner shown when the store rejects a valid submission.
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to create order. Please try again.";

// =============================================================================
// View Models
// =============================================================================

/// One line of an order card.
#[derive(Debug, Clone)]
pub struct LineView {
    pub meal_name: String,
    pub quantity: i32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// One order card on the listing page.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub placed_at: String,
    pub lines: Vec<LineView>,
    pub item_count: i64,
    pub total: Price,
}

impl From<&OrderDetail> for OrderView {
    fn from(order: &OrderDetail) -> Self {
        Self {
            id: order.id.as_i32(),
            placed_at: format_placed_at(order.created_at),
            lines: order
                .lines
                .iter()
                .map(|line| LineView {
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

/// A meal choice in an entry's picker.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub id: i32,
    pub label: String,
    pub selected: bool,
}

/// One row of the order form.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub index: usize,
    pub quantity: i64,
    pub options: Vec<OptionView>,
    pub unselected: bool,
    pub can_decrement: bool,
    pub meal_error: Option<&'static str>,
    pub quantity_error: Option<&'static str>,
}

/// Creation time as shown on order cards, e.g. `October 16, 2026, 03:04 PM`.
#[must_use]
pub fn format_placed_at(created_at: DateTime<Utc>) -> String {
    created_at.format("%B %-d, %Y, %I:%M %p").to_string()
}

// =============================================================================
// Templates
// =============================================================================

/// Listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub orders: Vec<OrderView>,
    pub has_meals: bool,
}

/// Order form fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_form.html")]
pub struct OrderFormTemplate {
    pub entries: Vec<EntryView>,
    pub has_meals: bool,
    pub list_error: Option<&'static str>,
    pub failure: Option<&'static str>,
}

impl OrderFormTemplate {
    /// Build the form for a draft, with optional inline errors and banner.
    #[must_use]
    pub fn new(
        draft: &OrderDraft,
        meals: &[Meal],
        errors: Option<&ValidationErrors>,
        failure: Option<&'static str>,
    ) -> Self {
        let entries = draft
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| EntryView {
                index,
                quantity: entry.quantity,
                options: meals
                    .iter()
                    .map(|meal| OptionView {
                        id: meal.id.as_i32(),
                        label: meal.option_label(),
                        selected: meal.id.as_i32() == entry.meal_id,
                    })
                    .collect(),
                unselected: !meals.iter().any(|meal| meal.id.as_i32() == entry.meal_id),
                can_decrement: entry.quantity > 1,
                meal_error: errors
                    .and_then(|e| e.meal_error(index))
                    .map(|e| e.kind.hint()),
                quantity_error: errors
                    .and_then(|e| e.quantity_error(index))
                    .map(|e| e.kind.hint()),
            })
            .collect();

        Self {
            entries,
            has_meals: !meals.is_empty(),
            list_error: errors.and_then(ValidationErrors::list_error).map(|e| e.kind.hint()),
            failure,
        }
    }
}

// =============================================================================
// Form Parsing
// =============================================================================

/// A submitted form: the draft rows plus the control that was pressed.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    pub draft: OrderDraft,
    pub op: Option<String>,
}

impl SubmittedForm {
    /// Rebuild the draft from repeated `meal_id` / `quantity` fields.
    ///
    /// Each `meal_id` starts a new row; the following `quantity` belongs to
    /// it. Unparseable values become the placeholder meal or quantity 0 so
    /// validation reports them instead of failing the request.
    #[must_use]
    pub fn parse(fields: &[(String, String)]) -> Self {
        let mut entries: Vec<DraftEntry> = Vec::new();
        let mut op = None;

        for (key, value) in fields {
            match key.as_str() {
                "meal_id" => entries.push(DraftEntry {
                    meal_id: value.trim().parse().unwrap_or(UNSELECTED_MEAL),
                    quantity: 1,
                }),
                "quantity" => {
                    let quantity = value.trim().parse().unwrap_or(0);
                    match entries.last_mut() {
                        Some(entry) => entry.quantity = quantity,
                        None => entries.push(DraftEntry {
                            meal_id: UNSELECTED_MEAL,
                            quantity,
                        }),
                    }
                }
                "op" => op = Some(value.clone()),
                _ => {}
            }
        }

        Self {
            draft: OrderDraft::from_entries(entries),
            op,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the order listing.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let service = state.orders();
    let (orders, meals) = tokio::try_join!(service.list_orders(), service.list_meals())?;

    Ok(OrdersIndexTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
        has_meals: !meals.is_empty(),
    }
    .into_response())
}

/// Open the order form with one empty entry (HTMX fragment).
#[instrument(skip(state))]
pub async fn new_form(State(state): State<AppState>) -> Response {
    let meals = load_meals(&state).await;
    OrderFormTemplate::new(&OrderDraft::new(), &meals, None, None).into_response()
}

/// Apply a form control and re-render the form (HTMX fragment).
#[instrument(skip_all)]
pub async fn form_action(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let SubmittedForm { mut draft, op } = SubmittedForm::parse(&fields);

    if let Some(op) = op {
        let action = op
            .parse::<DraftAction>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        draft.apply(action);
    }

    let meals = load_meals(&state).await;
    Ok(OrderFormTemplate::new(&draft, &meals, None, None).into_response())
}

/// Submit the order form.
///
/// HTMX only swaps 2xx responses, so validation and store failures re-render
/// the fragment with status 200.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let SubmittedForm { draft, .. } = SubmittedForm::parse(&fields);

    match state.orders().submit(&draft).await {
        Ok(order) => {
            add_breadcrumb("orders", &format!("Created order {}", order.id));

            if headers.contains_key("hx-request") {
                (StatusCode::OK, AppendHeaders([("HX-Redirect", "/")])).into_response()
            } else {
                Redirect::to("/").into_response()
            }
        }
        Err(SubmitError::Validation(errors)) => {
            let meals = load_meals(&state).await;
            OrderFormTemplate::new(&draft, &meals, Some(&errors), None).into_response()
        }
        Err(SubmitError::Persistence(e)) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Failed to create order"
            );
            let meals = load_meals(&state).await;
            OrderFormTemplate::new(&draft, &meals, None, Some(SUBMIT_FAILED_MESSAGE))
                .into_response()
        }
    }
}

/// Meal choices for the form. A failed read leaves the picker empty.
async fn load_meals(state: &AppState) -> Vec<Meal> {
    match state.orders().list_meals().await {
        Ok(meals) => meals.as_ref().clone(),
        Err(e) => {
            tracing::warn!("Failed to load meals: {e}");
            Vec::new()
        }
    }
}
