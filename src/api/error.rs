use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, BookingError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => ApiError::Conflict(err.to_string()),
            AuthError::UnknownUser | AuthError::InvalidSecondFactor => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::UnknownTheater(id) => ApiError::not_found("Theater", id),
            BookingError::UnknownShow(id) => ApiError::not_found("Show", id),
            BookingError::CapacityExceeded { .. } | BookingError::AlreadyBooked { .. } => {
                ApiError::Conflict(err.to_string())
            }
            BookingError::Validation(msg) => ApiError::ValidationError(msg),
            BookingError::Database(msg) => ApiError::DatabaseError(msg),
            BookingError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("Manager role required".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_auth_errors_do_not_leak_which_part_failed() {
        assert_eq!(status_of(AuthError::UnknownUser), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AuthError::InvalidSecondFactor),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(AuthError::DuplicateEmail), StatusCode::CONFLICT);
    }

    #[test]
    fn test_booking_error_statuses() {
        assert_eq!(status_of(BookingError::UnknownShow(3)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(BookingError::UnknownTheater(3)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(BookingError::CapacityExceeded {
                show_id: 1,
                capacity: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(BookingError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BookingError::Database("locked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
