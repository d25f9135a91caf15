use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use gatekeep_core::AppError;
use gatekeep_domain::LockoutNotice;
use tracing::error;

mod types;

use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(format!(
            "the request body is invalid: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            AppError::Locked {
                retry_after_seconds,
            } => {
                let notice = LockoutNotice::new(retry_after_seconds);
                let payload = Json(ErrorResponse::locked(
                    notice.message(),
                    notice.retry_after_seconds(),
                    notice.retry_after_minutes(),
                ));

                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, notice.retry_after_seconds().to_string())],
                    payload,
                )
                    .into_response()
            }
            AppError::Validation(message) | AppError::Unauthorized(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::for_login_field(message)),
            )
                .into_response(),
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorResponse::new(message))).into_response()
            }
            AppError::Internal(message) => {
                error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("internal server error".to_owned())),
                )
                    .into_response()
            }
        }
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
