//! Review repository trait.

use crate::aggregate::RatingSummary;
use crate::error::Result;
use crate::models::{NewReview, Review, ReviewChange, ReviewCommit, ReviewFilter};
use cinereview_core::{MovieId, Page, PageRequest, ReviewId};
use std::future::Future;

/// Check run against the current review inside the mutation unit, after the
/// movie is locked and before anything is written. Returning an error aborts
/// the mutation.
pub trait ReviewGuard: FnOnce(&Review) -> Result<()> + Send + 'static {}

impl<F> ReviewGuard for F where F: FnOnce(&Review) -> Result<()> + Send + 'static {}

/// Review storage with aggregate maintenance.
///
/// Implementations serialize all mutations of one movie's review set and
/// recompute that movie's aggregate from the committed set before the
/// mutation becomes visible. Mutations of different movies never wait on
/// each other.
pub trait ReviewRepository: Send + Sync + 'static {
    /// Insert a review and refresh its movie's aggregate.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Movie does not exist → `ReviewError::NotFound("Movie")`
    /// - Database query fails (nothing is committed)
    fn insert_review(&self, review: NewReview) -> impl Future<Output = Result<ReviewCommit>> + Send;

    /// Replace a review's content and rating and refresh the aggregate.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Review does not exist → `ReviewError::NotFound("Review")`
    /// - `guard` rejects the current review
    /// - Database query fails (nothing is committed)
    fn update_review<G: ReviewGuard>(
        &self,
        review_id: ReviewId,
        change: ReviewChange,
        guard: G,
    ) -> impl Future<Output = Result<ReviewCommit>> + Send;

    /// Delete a review and refresh the aggregate.
    ///
    /// The returned commit carries the review as it was before deletion.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Review does not exist → `ReviewError::NotFound("Review")`
    /// - `guard` rejects the current review
    /// - Database query fails (nothing is committed)
    fn delete_review<G: ReviewGuard>(
        &self,
        review_id: ReviewId,
        guard: G,
    ) -> impl Future<Output = Result<ReviewCommit>> + Send;

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn get_review(&self, review_id: ReviewId) -> impl Future<Output = Result<Option<Review>>> + Send;

    /// List reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn list_reviews(
        &self,
        filter: ReviewFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Review>>> + Send;

    /// Recompute and store a movie's aggregate from its current reviews.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Movie does not exist → `ReviewError::NotFound("Movie")`
    /// - Database query fails
    fn recompute_rating(
        &self,
        movie_id: MovieId,
    ) -> impl Future<Output = Result<RatingSummary>> + Send;
}
