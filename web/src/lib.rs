//! Axum integration for Cinereview.
//!
//! The pieces every HTTP handler in the service shares:
//!
//! - [`AppError`]: the `{code, message}` error envelope every domain error
//!   is converted into
//! - extractors: [`CorrelationId`], [`JsonBody`] (malformed bodies become
//!   `422 VALIDATION_ERROR`), [`QueryParams`] and [`PathParam`] (same for
//!   query strings and path segments), [`BearerToken`] (the raw
//!   `Authorization` header handed to the credential service)
//! - [`correlation_id_layer`]: request span and `X-Correlation-ID`
//!   propagation
//! - [`handlers::health_check`]: liveness
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use cinereview_web::{AppError, JsonBody, correlation_id_layer};
//!
//! async fn create(JsonBody(body): JsonBody<CreateRequest>) -> Result<Json<Created>, AppError> {
//!     let created = service.create(body).await.map_err(AppError::from)?;
//!     Ok(Json(created))
//! }
//!
//! let app = Router::new()
//!     .route("/api/things", post(create))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId, JsonBody, PathParam, QueryParams};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
