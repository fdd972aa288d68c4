use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::ServiceId;

/// Failures of the booking workflow. Everything here is shown to the user.
/// Unreadable persisted data never appears: it is logged and loaded as an
/// empty store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookingError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Sorry, this time slot is no longer available. Please select a different time.")]
    SlotUnavailable { conflicting: Option<ServiceId> },

    #[error("The booking request timed out")]
    SubmissionTimeout,

    #[error("{0}")]
    SubmissionRejected(String),

    #[error("Too many submissions. Please wait {window_minutes} minutes before trying again.")]
    RateLimited { window_minutes: u64 },

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

impl BookingError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        BookingError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Delivery failures happen after the local commit, which stays in place.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            BookingError::SubmissionTimeout
                | BookingError::SubmissionRejected(_)
                | BookingError::RateLimited { .. }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Booking(e) => match e {
                BookingError::Validation { .. } => StatusCode::BAD_REQUEST,
                BookingError::SlotUnavailable { .. } => StatusCode::CONFLICT,
                BookingError::InvalidTransition { .. } => StatusCode::CONFLICT,
                BookingError::SubmissionTimeout => StatusCode::GATEWAY_TIMEOUT,
                BookingError::SubmissionRejected(_) => StatusCode::BAD_GATEWAY,
                BookingError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let mut body = serde_json::json!({ "error": self.to_string() });
        if let AppError::Booking(e) = &self {
            match e {
                BookingError::Validation { field, .. } => {
                    body["field"] = serde_json::json!(field);
                }
                BookingError::SlotUnavailable {
                    conflicting: Some(service),
                } => {
                    body["conflicting_service"] = serde_json::json!(service);
                }
                _ => {}
            }
            if e.is_delivery_failure() {
                body["committed"] = serde_json::json!(true);
            }
        }
        (status, axum::Json(body)).into_response()
    }
}
