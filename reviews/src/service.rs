//! Review store operations: validation, ownership, and committing through
//! the repository so every change carries its movie's fresh aggregate.

use crate::error::{ReviewError, Result};
use crate::models::{NewReview, Review, ReviewChange, ReviewCommit, ReviewFilter, ReviewInput};
use crate::providers::ReviewRepository;
use cinereview_core::environment::SharedClock;
use cinereview_core::{MovieId, Page, PageRequest, ReviewId, UserId};
use std::sync::Arc;

/// Review store.
pub struct ReviewService<S> {
    store: Arc<S>,
    clock: SharedClock,
}

impl<S> Clone for ReviewService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Only the author may modify a review.
fn ensure_author(review: &Review, requester: UserId) -> Result<()> {
    if review.author_id == requester {
        Ok(())
    } else {
        tracing::warn!(
            review_id = %review.id,
            author_id = %review.author_id,
            requester = %requester,
            "review modification by non-author rejected"
        );
        Err(ReviewError::Forbidden)
    }
}

impl<S: ReviewRepository> ReviewService<S> {
    /// Create a service over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Create a review by `author` and refresh the movie's aggregate.
    ///
    /// # Errors
    ///
    /// `ReviewError::Validation` for blank content, a rating that is not an
    /// integer in `1..=5`, or a movie that does not exist.
    #[tracing::instrument(skip(self, input))]
    pub async fn create(
        &self,
        author: UserId,
        movie_id: MovieId,
        input: &ReviewInput,
    ) -> Result<ReviewCommit> {
        let (content, rating) = input.validate().inspect_err(|e| {
            tracing::debug!(error = %e, "review rejected");
        })?;

        let commit = self
            .store
            .insert_review(NewReview {
                movie_id,
                author_id: author,
                content,
                rating,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|e| match e {
                ReviewError::NotFound("Movie") => {
                    ReviewError::validation(format!("movie {movie_id} does not exist"))
                }
                other => other,
            })?;

        tracing::info!(
            review_id = %commit.review.id,
            rating = commit.review.rating.get(),
            review_count = commit.rating.review_count,
            "review created"
        );
        Ok(commit)
    }

    /// Replace the content and rating of a review owned by `requester`.
    ///
    /// Ownership is checked before the input, so a non-author is refused
    /// with `Forbidden` whatever the request contains.
    ///
    /// # Errors
    ///
    /// `NotFound`, then `Forbidden`, then `Validation`.
    #[tracing::instrument(skip(self, input))]
    pub async fn update(
        &self,
        review_id: ReviewId,
        requester: UserId,
        input: &ReviewInput,
    ) -> Result<ReviewCommit> {
        self.authorize(review_id, requester).await?;
        let (content, rating) = input.validate()?;

        let change = ReviewChange {
            content,
            rating,
            updated_at: self.clock.now(),
        };
        let commit = self
            .store
            .update_review(review_id, change, move |review: &Review| {
                ensure_author(review, requester)
            })
            .await?;

        tracing::info!(
            movie_id = %commit.review.movie_id,
            rating = commit.review.rating.get(),
            "review updated"
        );
        Ok(commit)
    }

    /// Delete a review owned by `requester`.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `Forbidden` for a non-author.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, review_id: ReviewId, requester: UserId) -> Result<ReviewCommit> {
        self.authorize(review_id, requester).await?;

        let commit = self
            .store
            .delete_review(review_id, move |review: &Review| {
                ensure_author(review, requester)
            })
            .await?;

        tracing::info!(
            movie_id = %commit.review.movie_id,
            review_count = commit.rating.review_count,
            "review deleted"
        );
        Ok(commit)
    }

    /// Fetch a review that `requester` may modify.
    ///
    /// Callers that still have to parse the request run this first, so the
    /// outcome for a missing review or a non-author does not depend on the
    /// request body.
    ///
    /// # Errors
    ///
    /// `NotFound`, then `Forbidden`.
    pub async fn authorize(&self, review_id: ReviewId, requester: UserId) -> Result<Review> {
        let review = self.get(review_id).await?;
        ensure_author(&review, requester)?;
        Ok(review)
    }

    /// Get a review.
    ///
    /// # Errors
    ///
    /// `ReviewError::NotFound` if absent.
    pub async fn get(&self, review_id: ReviewId) -> Result<Review> {
        self.store
            .get_review(review_id)
            .await?
            .ok_or(ReviewError::NotFound("Review"))
    }

    /// List reviews newest first. Read only.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list(&self, filter: ReviewFilter, page: PageRequest) -> Result<Page<Review>> {
        self.store.list_reviews(filter, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RatingSummary;
    use crate::mocks::MemoryReviewStore;
    use crate::models::NewMovie;
    use crate::providers::CatalogRepository;
    use cinereview_testing::MockClock;
    use serde_json::json;

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    async fn setup() -> (ReviewService<MemoryReviewStore>, MemoryReviewStore, MovieId, MockClock) {
        let store = MemoryReviewStore::new();
        let movie = store
            .insert_movie(NewMovie::titled("Heat"))
            .await
            .unwrap()
            .unwrap();
        let clock = MockClock::default();
        let service = ReviewService::new(Arc::new(store.clone()), Arc::new(clock.clone()));
        (service, store, movie.id, clock)
    }

    fn hundredths(summary: RatingSummary) -> Option<u16> {
        summary.average_rating.map(|a| a.hundredths())
    }

    #[tokio::test]
    async fn test_create_update_delete_scenario() {
        let (service, _, movie_id, _) = setup().await;

        let a = service
            .create(ALICE, movie_id, &ReviewInput::new("great", 5))
            .await
            .unwrap();
        assert_eq!(hundredths(a.rating), Some(500));

        let b = service
            .create(BOB, movie_id, &ReviewInput::new("bad", 1))
            .await
            .unwrap();
        assert_eq!(hundredths(b.rating), Some(300));

        let after_a = service.delete(a.review.id, ALICE).await.unwrap();
        assert_eq!(hundredths(after_a.rating), Some(100));

        let after_b = service.delete(b.review.id, BOB).await.unwrap();
        assert_eq!(after_b.rating, RatingSummary::EMPTY);
    }

    #[tokio::test]
    async fn test_non_author_is_forbidden_regardless_of_input() {
        let (service, _, movie_id, _) = setup().await;
        let a = service
            .create(ALICE, movie_id, &ReviewInput::new("great", 5))
            .await
            .unwrap();

        let valid = ReviewInput::new("hijack", 1);
        let invalid = ReviewInput {
            content: None,
            rating: Some(json!(4.5)),
        };

        assert_eq!(
            service.update(a.review.id, BOB, &valid).await,
            Err(ReviewError::Forbidden)
        );
        assert_eq!(
            service.update(a.review.id, BOB, &invalid).await,
            Err(ReviewError::Forbidden)
        );
        assert_eq!(
            service.delete(a.review.id, BOB).await,
            Err(ReviewError::Forbidden)
        );
        assert_eq!(service.get(a.review.id).await.unwrap(), a.review);
    }

    #[tokio::test]
    async fn test_authorize() {
        let (service, _, movie_id, _) = setup().await;
        let a = service
            .create(ALICE, movie_id, &ReviewInput::new("great", 5))
            .await
            .unwrap();

        assert_eq!(service.authorize(a.review.id, ALICE).await.unwrap(), a.review);
        assert_eq!(
            service.authorize(a.review.id, BOB).await,
            Err(ReviewError::Forbidden)
        );
        assert_eq!(
            service.authorize(ReviewId::new(404), BOB).await,
            Err(ReviewError::NotFound("Review"))
        );
    }

    #[tokio::test]
    async fn test_missing_review_is_not_found() {
        let (service, _, _, _) = setup().await;
        let missing = ReviewId::new(404);

        assert_eq!(
            service.update(missing, ALICE, &ReviewInput::new("x", 3)).await,
            Err(ReviewError::NotFound("Review"))
        );
        assert_eq!(
            service.delete(missing, ALICE).await,
            Err(ReviewError::NotFound("Review"))
        );
    }

    #[tokio::test]
    async fn test_create_against_unknown_movie_is_validation_error() {
        let (service, _, _, _) = setup().await;

        let result = service
            .create(ALICE, MovieId::new(999), &ReviewInput::new("x", 3))
            .await;
        assert!(matches!(result, Err(ReviewError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rating_bounds() {
        let (service, store, movie_id, _) = setup().await;

        for bad in [json!(0), json!(6), json!(-1), json!(2.5), json!("3"), json!(null)] {
            let input = ReviewInput {
                content: Some("text".into()),
                rating: Some(bad),
            };
            assert!(matches!(
                service.create(ALICE, movie_id, &input).await,
                Err(ReviewError::Validation(_))
            ));
        }
        assert_eq!(store.review_count(), 0);

        for good in [1, 5] {
            assert!(service
                .create(ALICE, movie_id, &ReviewInput::new("text", good))
                .await
                .is_ok());
        }
    }

    #[tokio::test]
    async fn test_update_keeps_movie_and_author() {
        let (service, _, movie_id, clock) = setup().await;
        let created = service
            .create(ALICE, movie_id, &ReviewInput::new("first", 2))
            .await
            .unwrap();

        clock.advance(chrono::Duration::minutes(5));
        let updated = service
            .update(created.review.id, ALICE, &ReviewInput::new("second", 4))
            .await
            .unwrap();

        assert_eq!(updated.review.movie_id, movie_id);
        assert_eq!(updated.review.author_id, ALICE);
        assert_eq!(updated.review.content, "second");
        assert_eq!(updated.review.created_at, created.review.created_at);
        assert_eq!(
            updated.review.updated_at,
            created.review.updated_at + chrono::Duration::minutes(5)
        );
        assert_eq!(hundredths(updated.rating), Some(400));
    }

    #[tokio::test]
    async fn test_storage_failure_fails_the_mutation() {
        let (service, store, movie_id, _) = setup().await;

        store.fail_next_refresh();
        let result = service
            .create(ALICE, movie_id, &ReviewInput::new("text", 5))
            .await;

        assert!(result.unwrap_err().is_internal());
        let listed = service
            .list(ReviewFilter::for_movie(movie_id), PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(listed.total, 0);
    }
}
