//! Rating aggregator.
//!
//! Review mutations refresh their movie's aggregate inside the repository's
//! mutation unit. This type exposes the same recomputation on demand, for a
//! single movie or as a reconciliation pass over the whole catalog.

use crate::aggregate::RatingSummary;
use crate::error::Result;
use crate::providers::{CatalogRepository, ReviewRepository};
use cinereview_core::MovieId;
use std::sync::Arc;

/// Recomputes and stores movie aggregates.
pub struct RatingAggregator<S> {
    store: Arc<S>,
}

impl<S> Clone for RatingAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ReviewRepository + CatalogRepository> RatingAggregator<S> {
    /// Create an aggregator over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Recompute one movie's aggregate from its current reviews.
    ///
    /// Idempotent: without intervening review mutations, repeated calls
    /// store and return the same value.
    ///
    /// # Errors
    ///
    /// `ReviewError::NotFound` if the movie is absent, or storage failures.
    #[tracing::instrument(skip(self))]
    pub async fn recompute(&self, movie_id: MovieId) -> Result<RatingSummary> {
        let summary = self.store.recompute_rating(movie_id).await?;
        tracing::debug!(
            average_rating = ?summary.average_rating.map(|a| a.to_string()),
            review_count = summary.review_count,
            "aggregate recomputed"
        );
        Ok(summary)
    }

    /// Recompute every movie's aggregate. Returns the number of movies
    /// processed.
    ///
    /// # Errors
    ///
    /// Stops at the first storage failure.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile_all(&self) -> Result<usize> {
        let movie_ids = self.store.movie_ids().await?;
        for movie_id in &movie_ids {
            self.store.recompute_rating(*movie_id).await?;
        }
        tracing::info!(movies = movie_ids.len(), "aggregates reconciled");
        Ok(movie_ids.len())
    }
}
