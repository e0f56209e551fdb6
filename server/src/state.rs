//! Application state shared by all handlers.
//!
//! Generic over the user repository `U` and the catalog/review store `S`,
//! so the same router serves the in-memory and the PostgreSQL backends.

use cinereview_auth::{AuthConfig, CredentialService, UserRepository};
use cinereview_core::environment::SharedClock;
use cinereview_reviews::{CatalogRepository, CatalogService, ReviewRepository, ReviewService};
use std::sync::Arc;

/// Services behind the HTTP surface. Cloned (cheaply, via `Arc`) per request.
pub struct AppState<U, S> {
    /// Registration, login and bearer token resolution
    pub credentials: CredentialService<U>,
    /// Review mutations and listings
    pub reviews: ReviewService<S>,
    /// Movie listing, lookup and aggregates
    pub catalog: CatalogService<S>,
}

impl<U, S> Clone for AppState<U, S> {
    fn clone(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            reviews: self.reviews.clone(),
            catalog: self.catalog.clone(),
        }
    }
}

impl<U, S> AppState<U, S>
where
    U: UserRepository,
    S: ReviewRepository + CatalogRepository,
{
    /// Wire the services over the given storage.
    ///
    /// # Errors
    ///
    /// Returns [`cinereview_auth::AuthError`] if the password hashing
    /// parameters are rejected.
    pub fn new(
        users: Arc<U>,
        store: Arc<S>,
        auth: &AuthConfig,
        clock: SharedClock,
    ) -> cinereview_auth::Result<Self> {
        Ok(Self {
            credentials: CredentialService::new(users, auth, Arc::clone(&clock))?,
            reviews: ReviewService::new(Arc::clone(&store), clock),
            catalog: CatalogService::new(store),
        })
    }
}
