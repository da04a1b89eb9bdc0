//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an order ID for display.
///
/// Usage in templates: `{{ order.id|order_number }}` renders `#12`.
#[askama::filter_fn]
pub fn order_number(id: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("#{id}"))
}

/// Pluralizes "item" for a count.
///
/// Usage in templates: `{{ order.item_count|items }}` renders `1 item` or `3 items`.
#[askama::filter_fn]
pub fn items(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let count = count.to_string();
    let noun = if count == "1" { "item" } else { "items" };
    Ok(format!("{count} {noun}"))
}
