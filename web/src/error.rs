//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses. Every response
//! body has the shape `{"code": ..., "message": ...}`; `code` is stable and
//! meant for clients to branch on, `message` is for humans.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cinereview_auth::AuthError;
use cinereview_reviews::ReviewError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// The optional source is only ever logged, never sent to the client.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Movie>, AppError> {
///     let movie = catalog.get(id).await?;
///     Ok(Json(movie))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach an error that is logged but not exposed.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 422 `VALIDATION_ERROR`.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR",
        )
    }

    /// 401 with the given code.
    #[must_use]
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), code)
    }

    /// 403 `FORBIDDEN`.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN")
    }

    /// 404 `NOT_FOUND`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// 409 with the given code.
    #[must_use]
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), code)
    }

    /// 500 `INTERNAL_SERVER_ERROR` with a generic message.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred".to_string(),
            "INTERNAL_SERVER_ERROR",
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(status = %self.status, code = self.code, "Internal server error");
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal().with_source(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::Validation(_) => Self::validation(message),
            AuthError::MissingToken => Self::unauthorized("UNAUTHORIZED", message),
            AuthError::InvalidToken => Self::unauthorized("INVALID_TOKEN", message),
            AuthError::ExpiredToken => Self::unauthorized("TOKEN_EXPIRED", message),
            AuthError::UnknownIdentity => Self::unauthorized("UNKNOWN_IDENTITY", message),
            AuthError::InvalidCredentials => Self::unauthorized("INVALID_CREDENTIALS", message),
            AuthError::DuplicateIdentity => Self::conflict("DUPLICATE_IDENTITY", message),
            AuthError::DatabaseError(_) | AuthError::InternalError => {
                Self::internal().with_source(anyhow::Error::new(err))
            }
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        let message = err.to_string();
        match err {
            ReviewError::Validation(_) => Self::validation(message),
            ReviewError::NotFound(_) => Self::not_found(message),
            ReviewError::Forbidden => Self::forbidden(message),
            ReviewError::DatabaseError(_) | ReviewError::InternalError => {
                Self::internal().with_source(anyhow::Error::new(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::validation("rating must be between 1 and 5");
        assert_eq!(
            err.to_string(),
            "[VALIDATION_ERROR] rating must be between 1 and 5"
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let cases = [
            (AuthError::MissingToken, StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            (AuthError::ExpiredToken, StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            (AuthError::UnknownIdentity, StatusCode::UNAUTHORIZED, "UNKNOWN_IDENTITY"),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            (AuthError::DuplicateIdentity, StatusCode::CONFLICT, "DUPLICATE_IDENTITY"),
            (
                AuthError::Validation("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let app = AppError::from(err);
            assert_eq!(app.status(), status);
            assert_eq!(app.code(), code);
        }
    }

    #[test]
    fn test_review_error_mapping() {
        assert_eq!(AppError::from(ReviewError::Forbidden).status(), StatusCode::FORBIDDEN);
        let not_found = AppError::from(ReviewError::NotFound("Review"));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.message(), "Review not found");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::from(ReviewError::DatabaseError("connection refused".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert!(!err.message().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_response_body() {
        let response = AppError::forbidden("nope").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"code": "FORBIDDEN", "message": "nope"}));
    }
}
