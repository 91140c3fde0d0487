use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// ApiError
///
/// The closed error taxonomy surfaced to clients. Authorization failures
/// short-circuit before any store operation runs; store failures on the
/// search path map to `Internal`. Every variant renders as a JSON object
/// with a `message` (or `error` for internal failures) string field.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No `Authorization: Bearer` header was present on a protected route.
    MissingCredential,
    /// The bearer token failed signature verification or is expired.
    InvalidCredential,
    /// The verified identity lacks the privilege the route requires.
    Forbidden,
    /// A single-document lookup matched nothing.
    NotFound,
    /// Catch-all for store/search failures. No retries are attempted.
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                json!({"message": "unauthorized access"}),
            ),
            ApiError::InvalidCredential => (
                StatusCode::UNAUTHORIZED,
                json!({"message": "unauthorized access"}),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({"message": "forbidden access"}),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({"message": "not found"})),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "internal server error"}),
            ),
        };
        (status, Json(body)).into_response()
    }
}
