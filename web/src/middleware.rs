//! Correlation-id middleware.
//!
//! Every request gets a correlation id: the client's `X-Correlation-ID` when
//! it is a valid UUID, otherwise a fresh v4. The id is stored in the request
//! extensions (read it with [`CorrelationId`](crate::CorrelationId) or
//! [`CorrelationIdExt`]), the request runs inside an `http_request` span that
//! also records the response status, and the id is echoed back in the
//! response header.
//!
//! ```ignore
//! let api = Router::new()
//!     .route("/reviews", get(list_reviews::<U, S>).post(create_review::<U, S>))
//!     .route("/reviews/:id", put(update_review::<U, S>));
//!
//! Router::new()
//!     .nest("/api", api)
//!     .route("/health", get(health_check))
//!     .layer(correlation_id_layer())
//!     .with_state(state)
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// The client-supplied correlation id, if it is a valid UUID.
pub(crate) fn correlation_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}

/// Layer installing [`CorrelationIdMiddleware`].
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// See [`correlation_id_layer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Assigns, records and echoes the correlation id.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = correlation_id_from(req.headers()).unwrap_or_else(Uuid::new_v4);
        req.extensions_mut().insert(correlation_id);

        // Paths only; query strings may carry search terms.
        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
            status = tracing::field::Empty,
        );
        let started = Instant::now();
        let fut = self.inner.call(req).instrument(span.clone());

        Box::pin(async move {
            let mut response = fut.await?;

            let status = response.status().as_u16();
            span.record("status", status);
            span.in_scope(|| {
                tracing::debug!(
                    status,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "request finished"
                );
            });

            if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }
            Ok(response)
        })
    }
}

/// Read the correlation id stored by [`correlation_id_layer`].
pub trait CorrelationIdExt {
    /// The correlation id, or `None` when the middleware is not installed.
    fn correlation_id(&self) -> Option<Uuid>;
}

impl<B> CorrelationIdExt for axum::http::Request<B> {
    fn correlation_id(&self) -> Option<Uuid> {
        self.extensions().get::<Uuid>().copied()
    }
}
