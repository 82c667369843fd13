//! HTTP error type for coursehub-server
//!
//! Every failure leaves the server as `{"error": "<message>"}` with the
//! matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing, invalid or expired token (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not allow it (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Conflict (409), e.g. username or lesson position already taken
    #[error("{0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<coursehub_common::Error> for ApiError {
    fn from(err: coursehub_common::Error) -> Self {
        use coursehub_common::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return ApiError::Conflict("Resource already exists".to_string());
                    }
                }
                error!("Database error: {}", e);
                ApiError::Internal("Database error".to_string())
            }
            other => {
                error!("Internal error: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_common::Error;

    #[test]
    fn test_common_errors_map_to_status() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (Error::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (Error::Conflict("x".into()), StatusCode::CONFLICT),
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_message_passes_through_unprefixed() {
        let err = ApiError::from(Error::NotFound("Course not found".into()));
        assert_eq!(err.to_string(), "Course not found");
    }
}
