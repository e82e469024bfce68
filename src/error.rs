use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::booking::BookingError;
use crate::validation::ValidationError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::CapacityComputation(_)
            | BookingError::ClientNotFound(_)
            | BookingError::BookingNotFound(_) => ApiError::NotFound(value.to_string()),
            BookingError::ClassInactive(_) | BookingError::DateMismatch(_) => {
                ApiError::BadRequest(value.to_string())
            }
            BookingError::Duplicate(_)
            | BookingError::CancellationWindow { .. }
            | BookingError::InvalidStateTransition { .. }
            | BookingError::OnWaitingList(_) => {
                warn!(error = %value, "booking rejected");
                ApiError::Conflict(value.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::BadRequest(value.0)
    }
}
