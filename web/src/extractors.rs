//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: request correlation id (header or freshly generated)
//! - [`JsonBody`]: JSON body whose rejections are reported as
//!   `422 VALIDATION_ERROR` in the service's error envelope
//! - [`QueryParams`] and [`PathParam`]: query string and path segments
//!   with the same rejection behaviour
//! - [`BearerToken`]: the raw `Authorization` header, if any

use crate::error::AppError;
use crate::middleware::correlation_id_from;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Taken from request extensions when [`correlation_id_layer`] is
/// installed, otherwise from the `X-Correlation-ID` header, otherwise a new
/// UUID v4.
///
/// [`correlation_id_layer`]: crate::middleware::correlation_id_layer
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        Ok(Self(
            correlation_id_from(&parts.headers).unwrap_or_else(Uuid::new_v4),
        ))
    }
}

/// JSON request body.
///
/// Same as [`axum::Json`], except that a missing content type, malformed
/// JSON or a body that does not fit `T` is rejected with an [`AppError`]
/// (`422 VALIDATION_ERROR`) instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected request body");
                Err(AppError::validation(rejection.body_text()))
            }
        }
    }
}

/// Query string parameters.
///
/// Same as [`axum::extract::Query`], but unparsable parameters (for example
/// `?page=abc`) are rejected with `422 VALIDATION_ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::validation(rejection.body_text())),
        }
    }
}

/// Path parameters.
///
/// Same as [`axum::extract::Path`], but a segment that does not parse (for
/// example `/api/movies/abc` for an integer id) is rejected with
/// `422 VALIDATION_ERROR`.
#[derive(Debug, Clone, Copy)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::validation(rejection.body_text())),
        }
    }
}

/// Raw `Authorization` header value.
///
/// Never rejects: whether a missing or malformed header is an error is
/// decided by the credential service.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(Option<String>);

impl BearerToken {
    /// The header value, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(Self(value))
    }
}
