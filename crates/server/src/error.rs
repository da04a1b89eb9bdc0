//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. JSON handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use meal_orders_core::ValidationErrors;
use serde_json::json;
use thiserror::Error;

use crate::db::PersistenceError;
use crate::services::SubmitError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Submitted input broke one or more rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(errors) => Self::Validation(errors),
            SubmitError::Persistence(err) => Self::Persistence(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Persistence(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            // Don't expose internal error details to clients
            Self::Persistence(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("Not found: {what}") })),
            )
                .into_response(),
            Self::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": reason })),
            )
                .into_response(),
        }
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
