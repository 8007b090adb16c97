//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credentials.
    Unauthorized,
    /// Valid credentials but the wrong role.
    Forbidden,
    /// A workflow error; status code depends on the kind.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => error_body(
                StatusCode::UNAUTHORIZED,
                "missing or invalid credentials".to_string(),
            ),
            ApiError::Forbidden => error_body(
                StatusCode::FORBIDDEN,
                "insufficient role for this operation".to_string(),
            ),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        }
    }
}

fn checkout_error_to_response(err: CheckoutError) -> Response {
    match &err {
        CheckoutError::NotFound(_) => error_body(StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::InvalidArgument(_)
        | CheckoutError::InvalidOrder(_)
        | CheckoutError::InvalidTransition { .. } => {
            error_body(StatusCode::BAD_REQUEST, err.to_string())
        }
        CheckoutError::InsufficientStock(shortfalls) => {
            // Every offending product is reported in one response.
            let body = serde_json::json!({
                "error": err.to_string(),
                "shortfalls": shortfalls,
            });
            (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
        }
        CheckoutError::MissingReference(_) | CheckoutError::Store(_) => {
            tracing::error!(error = %err, "internal server error");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    let body = serde_json::json!({ "error": message });
    (status, axum::Json(body)).into_response()
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
