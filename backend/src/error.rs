// backend/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failures raised by the TAT engine and the routes built on top of it.
#[derive(Debug, Error)]
pub enum TatError {
    /// A negative SLA budget reached the due-date engine.
    #[error("invalid TAT budget: {0} business days")]
    InvalidBudget(i64),

    /// Holiday or weekend source could not be read; no evaluation is attempted.
    #[error("business calendar unavailable: {0}")]
    CalendarUnavailable(String),

    /// The stored calendar cannot be used (e.g. every weekday marked off).
    #[error("calendar configuration error: {0}")]
    Configuration(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl TatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBudget(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::CalendarUnavailable(_) | Self::Configuration(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // driver details stay in the log
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                "internal error".to_string()
            }
            other => {
                tracing::warn!(error = %other, status = status.as_u16(), "request failed");
                other.to_string()
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
