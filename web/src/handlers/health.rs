//! Liveness endpoint.
//!
//! Used by load balancers and orchestrators to check that the process is
//! serving requests. It does not touch the database.

use axum::Json;
use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: &'static str,
    /// Crate version of the running binary.
    pub version: &'static str,
}

/// Simple health check endpoint.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ok", "version": "0.1.0" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
