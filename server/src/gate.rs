//! Access gate extractors.
//!
//! - [`CurrentUser`]: requires a valid bearer token, otherwise the request
//!   is rejected with 401 and the specific reason
//! - [`MaybeUser`]: resolves a bearer token when one is usable, never
//!   rejects
//!
//! ```rust,ignore
//! async fn me(CurrentUser(identity): CurrentUser) -> Json<Identity> {
//!     Json(identity)
//! }
//! ```

use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use cinereview_auth::{Identity, UserRepository};
use cinereview_web::{AppError, BearerToken};
use std::convert::Infallible;

/// Authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

/// Caller identity if a usable bearer token was presented.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<Identity>);

#[async_trait]
impl<U, S> FromRequestParts<AppState<U, S>> for CurrentUser
where
    U: UserRepository,
    S: Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, S>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        let identity = state.credentials.require_auth(bearer.header()).await?;
        Ok(Self(identity))
    }
}

#[async_trait]
impl<U, S> FromRequestParts<AppState<U, S>> for MaybeUser
where
    U: UserRepository,
    S: Send + Sync + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, S>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        Ok(Self(state.credentials.optional_auth(bearer.header()).await))
    }
}

impl MaybeUser {
    /// Whether the caller is the user with the given id.
    #[must_use]
    pub fn is(&self, user_id: cinereview_core::UserId) -> bool {
        self.0.as_ref().is_some_and(|identity| identity.id == user_id)
    }
}
