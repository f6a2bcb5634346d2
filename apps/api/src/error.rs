use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vitrine_core::AppError;

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        let (status, payload) = match self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorResponse::new(message)),
            AppError::InvalidField { field, .. } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(message).with_field(field),
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorResponse::new(message)),
            AppError::DependentsExist {
                dependent, field, ..
            } => (
                StatusCode::CONFLICT,
                ErrorResponse::new(message)
                    .with_field(field)
                    .blocked_by(dependent),
            ),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, ErrorResponse::new(message)),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorResponse::new(message)),
            AppError::Internal(_) => {
                tracing::error!(error = %message, "request failed with an internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal error".to_owned()),
                )
            }
        };

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
