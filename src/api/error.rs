//! HTTP mapping for engine errors.
//!
//! Every failure leaves the service as `{"message": "..."}`. Storage failures
//! and invariant violations are logged and redacted to a generic 500.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::habit::HabitError;

/// Convenient result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No authenticated principal on the request.
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Habit(#[from] HabitError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Habit(HabitError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Habit(HabitError::NotFound) => StatusCode::NOT_FOUND,
            Self::Habit(HabitError::AlreadyCheckedIn | HabitError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Habit(
                HabitError::Invariant(_) | HabitError::Storage(_) | HabitError::Internal(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Do not leak storage details to clients.
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(HabitError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(HabitError::AlreadyCheckedIn).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(HabitError::Invariant("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(HabitError::Internal("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_are_redacted() {
        let response =
            ApiError::from(HabitError::Internal("disk on fire".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
