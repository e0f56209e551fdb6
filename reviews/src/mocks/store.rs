//! In-memory catalog and review store.
//!
//! Each movie is a partition holding the movie record and its reviews behind
//! one lock. A review mutation takes that lock, applies the change,
//! recomputes the aggregate from the partition's reviews and releases the
//! lock, so readers never observe a review set and an aggregate that
//! disagree. Partitions live in a `DashMap`, so mutations of different
//! movies do not contend.

use crate::aggregate::{RatingSummary, summarize};
use crate::error::{ReviewError, Result};
use crate::models::{
    Movie, MovieSummary, NewMovie, NewReview, Review, ReviewChange, ReviewCommit, ReviewFilter,
};
use crate::providers::{CatalogRepository, ReviewGuard, ReviewRepository};
use cinereview_core::{MovieId, Page, PageRequest, ReviewId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeMap;
use std::future::{Future, ready};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct MoviePartition {
    movie: Movie,
    reviews: BTreeMap<ReviewId, Review>,
}

type Partition = Arc<RwLock<MoviePartition>>;

#[derive(Debug, Default)]
struct Inner {
    partitions: DashMap<MovieId, Partition>,
    titles: DashMap<String, MovieId>,
    review_movies: DashMap<ReviewId, MovieId>,
    last_movie_id: AtomicI64,
    last_review_id: AtomicI64,
    fail_next_refresh: AtomicBool,
}

/// In-memory catalog and review store.
///
/// Cloning is cheap; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryReviewStore {
    inner: Arc<Inner>,
}

/// Listing order: newest first, ties broken by id descending.
fn newest_first(a: &Review, b: &Review) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn read(partition: &Partition) -> Result<RwLockReadGuard<'_, MoviePartition>> {
    partition.read().map_err(|_| ReviewError::InternalError)
}

fn write(partition: &Partition) -> Result<RwLockWriteGuard<'_, MoviePartition>> {
    partition.write().map_err(|_| ReviewError::InternalError)
}

impl MemoryReviewStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next aggregate refresh fail, as a storage outage would.
    ///
    /// The mutation that hits the failure is rolled back.
    pub fn fail_next_refresh(&self) {
        self.inner.fail_next_refresh.store(true, Ordering::SeqCst);
    }

    /// Total number of stored reviews.
    #[must_use]
    pub fn review_count(&self) -> usize {
        self.inner.review_movies.len()
    }

    fn partition(&self, movie_id: MovieId) -> Option<Partition> {
        self.inner
            .partitions
            .get(&movie_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn all_partitions(&self) -> Vec<Partition> {
        self.inner
            .partitions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Partition owning `review_id`.
    fn partition_of(&self, review_id: ReviewId) -> Result<Partition> {
        let movie_id = self
            .inner
            .review_movies
            .get(&review_id)
            .map(|entry| *entry.value())
            .ok_or(ReviewError::NotFound("Review"))?;
        self.partition(movie_id).ok_or(ReviewError::InternalError)
    }

    /// Recompute the partition's aggregate from its reviews and store it on
    /// the movie. Caller holds the write lock.
    fn refresh(&self, partition: &mut MoviePartition) -> Result<RatingSummary> {
        if self.inner.fail_next_refresh.swap(false, Ordering::SeqCst) {
            tracing::error!(movie_id = %partition.movie.id, "aggregate refresh failed");
            return Err(ReviewError::DatabaseError("aggregate refresh failed".into()));
        }

        let summary = summarize(partition.reviews.values().map(|r| r.rating));
        partition.movie.average_rating = summary.average_rating;
        partition.movie.review_count = summary.review_count;
        Ok(summary)
    }

    fn insert_movie_now(&self, movie: NewMovie) -> Result<Option<Movie>> {
        movie.validate()?;
        let title = movie.title.trim().to_owned();

        match self.inner.titles.entry(title.clone()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                let id = MovieId::new(self.inner.last_movie_id.fetch_add(1, Ordering::SeqCst) + 1);
                let stored = Movie {
                    id,
                    title,
                    poster_path: movie.poster_path,
                    genre: movie.genre,
                    tagline: movie.tagline,
                    release_date: movie.release_date,
                    average_rating: None,
                    review_count: 0,
                };
                self.inner.partitions.insert(
                    id,
                    Arc::new(RwLock::new(MoviePartition {
                        movie: stored.clone(),
                        reviews: BTreeMap::new(),
                    })),
                );
                slot.insert(id);
                Ok(Some(stored))
            }
        }
    }

    fn get_movie_now(&self, movie_id: MovieId) -> Result<Option<Movie>> {
        self.partition(movie_id)
            .map(|partition| read(&partition).map(|p| p.movie.clone()))
            .transpose()
    }

    fn list_movies_now(&self, search: Option<&str>, page: PageRequest) -> Result<Page<Movie>> {
        let needle = search.map(str::to_lowercase);
        let mut movies = Vec::new();
        for partition in self.all_partitions() {
            let partition = read(&partition)?;
            let matches = needle
                .as_deref()
                .is_none_or(|needle| partition.movie.title.to_lowercase().contains(needle));
            if matches {
                movies.push(partition.movie.clone());
            }
        }
        movies.sort_by_key(|movie| movie.id);
        Ok(Page::from_sorted(movies, page))
    }

    fn get_movie_summaries_now(&self, movie_ids: &[MovieId]) -> Result<Vec<MovieSummary>> {
        movie_ids
            .iter()
            .filter_map(|id| self.partition(*id))
            .map(|partition| read(&partition).map(|p| p.movie.summary()))
            .collect()
    }

    fn movie_ids_now(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.inner.partitions.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    fn insert_review_now(&self, review: NewReview) -> Result<ReviewCommit> {
        let partition = self
            .partition(review.movie_id)
            .ok_or(ReviewError::NotFound("Movie"))?;
        let mut partition = write(&partition)?;

        let id = ReviewId::new(self.inner.last_review_id.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = Review {
            id,
            movie_id: review.movie_id,
            author_id: review.author_id,
            content: review.content,
            rating: review.rating,
            created_at: review.created_at,
            updated_at: review.created_at,
        };
        partition.reviews.insert(id, stored.clone());

        let rating = match self.refresh(&mut partition) {
            Ok(rating) => rating,
            Err(e) => {
                partition.reviews.remove(&id);
                return Err(e);
            }
        };
        self.inner.review_movies.insert(id, stored.movie_id);

        Ok(ReviewCommit {
            review: stored,
            rating,
        })
    }

    fn update_review_now(
        &self,
        review_id: ReviewId,
        change: ReviewChange,
        guard: impl ReviewGuard,
    ) -> Result<ReviewCommit> {
        let partition = self.partition_of(review_id)?;
        let mut partition = write(&partition)?;

        let current = partition
            .reviews
            .get(&review_id)
            .cloned()
            .ok_or(ReviewError::NotFound("Review"))?;
        guard(&current)?;

        let updated = Review {
            content: change.content,
            rating: change.rating,
            updated_at: change.updated_at,
            ..current.clone()
        };
        partition.reviews.insert(review_id, updated.clone());

        match self.refresh(&mut partition) {
            Ok(rating) => Ok(ReviewCommit {
                review: updated,
                rating,
            }),
            Err(e) => {
                partition.reviews.insert(review_id, current);
                Err(e)
            }
        }
    }

    fn delete_review_now(&self, review_id: ReviewId, guard: impl ReviewGuard) -> Result<ReviewCommit> {
        let partition = self.partition_of(review_id)?;
        let mut partition = write(&partition)?;

        let current = partition
            .reviews
            .get(&review_id)
            .cloned()
            .ok_or(ReviewError::NotFound("Review"))?;
        guard(&current)?;

        partition.reviews.remove(&review_id);
        match self.refresh(&mut partition) {
            Ok(rating) => {
                self.inner.review_movies.remove(&review_id);
                Ok(ReviewCommit {
                    review: current,
                    rating,
                })
            }
            Err(e) => {
                partition.reviews.insert(review_id, current);
                Err(e)
            }
        }
    }

    fn get_review_now(&self, review_id: ReviewId) -> Result<Option<Review>> {
        let partition = match self.partition_of(review_id) {
            Ok(partition) => partition,
            Err(ReviewError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        read(&partition).map(|p| p.reviews.get(&review_id).cloned())
    }

    fn list_reviews_now(&self, filter: ReviewFilter, page: PageRequest) -> Result<Page<Review>> {
        let partitions = match filter.movie_id {
            Some(movie_id) => self.partition(movie_id).into_iter().collect(),
            None => self.all_partitions(),
        };

        let mut reviews = Vec::new();
        for partition in partitions {
            let partition = read(&partition)?;
            reviews.extend(
                partition
                    .reviews
                    .values()
                    .filter(|review| filter.matches(review))
                    .cloned(),
            );
        }
        reviews.sort_by(newest_first);
        Ok(Page::from_sorted(reviews, page))
    }

    fn recompute_rating_now(&self, movie_id: MovieId) -> Result<RatingSummary> {
        let partition = self
            .partition(movie_id)
            .ok_or(ReviewError::NotFound("Movie"))?;
        let mut partition = write(&partition)?;
        self.refresh(&mut partition)
    }
}

impl CatalogRepository for MemoryReviewStore {
    fn insert_movie(&self, movie: NewMovie) -> impl Future<Output = Result<Option<Movie>>> + Send {
        ready(self.insert_movie_now(movie))
    }

    fn get_movie(&self, movie_id: MovieId) -> impl Future<Output = Result<Option<Movie>>> + Send {
        ready(self.get_movie_now(movie_id))
    }

    fn list_movies(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Movie>>> + Send {
        ready(self.list_movies_now(search, page))
    }

    fn get_movie_summaries(
        &self,
        movie_ids: &[MovieId],
    ) -> impl Future<Output = Result<Vec<MovieSummary>>> + Send {
        ready(self.get_movie_summaries_now(movie_ids))
    }

    fn movie_ids(&self) -> impl Future<Output = Result<Vec<MovieId>>> + Send {
        ready(Ok(self.movie_ids_now()))
    }
}

impl ReviewRepository for MemoryReviewStore {
    fn insert_review(&self, review: NewReview) -> impl Future<Output = Result<ReviewCommit>> + Send {
        ready(self.insert_review_now(review))
    }

    fn update_review<G: ReviewGuard>(
        &self,
        review_id: ReviewId,
        change: ReviewChange,
        guard: G,
    ) -> impl Future<Output = Result<ReviewCommit>> + Send {
        ready(self.update_review_now(review_id, change, guard))
    }

    fn delete_review<G: ReviewGuard>(
        &self,
        review_id: ReviewId,
        guard: G,
    ) -> impl Future<Output = Result<ReviewCommit>> + Send {
        ready(self.delete_review_now(review_id, guard))
    }

    fn get_review(&self, review_id: ReviewId) -> impl Future<Output = Result<Option<Review>>> + Send {
        ready(self.get_review_now(review_id))
    }

    fn list_reviews(
        &self,
        filter: ReviewFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Review>>> + Send {
        ready(self.list_reviews_now(filter, page))
    }

    fn recompute_rating(
        &self,
        movie_id: MovieId,
    ) -> impl Future<Output = Result<RatingSummary>> + Send {
        ready(self.recompute_rating_now(movie_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use chrono::{Duration, TimeZone, Utc};
    use cinereview_core::UserId;

    fn page(limit: u32) -> PageRequest {
        PageRequest::new(1, limit).unwrap()
    }

    fn new_review(movie_id: MovieId, author: i64, rating: i64, minute: i64) -> NewReview {
        NewReview {
            movie_id,
            author_id: UserId::new(author),
            content: "text".into(),
            rating: Rating::new(rating).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minute),
        }
    }

    fn allow(_: &Review) -> Result<()> {
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_title_is_skipped() {
        let store = MemoryReviewStore::new();
        let first = store.insert_movie(NewMovie::titled("Heat")).await.unwrap();
        let second = store.insert_movie(NewMovie::titled("Heat")).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(store.movie_ids().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_ordered_by_id() {
        let store = MemoryReviewStore::new();
        for title in ["The Matrix", "Heat", "Matrix Reloaded"] {
            store.insert_movie(NewMovie::titled(title)).await.unwrap();
        }

        let found = store.list_movies(Some("matrix"), page(10)).await.unwrap();
        let titles: Vec<_> = found.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["The Matrix", "Matrix Reloaded"]);
        assert_eq!(found.total, 2);
    }

    #[tokio::test]
    async fn test_insert_review_into_missing_movie() {
        let store = MemoryReviewStore::new();
        let result = store.insert_review(new_review(MovieId::new(9), 1, 5, 0)).await;
        assert_eq!(result, Err(ReviewError::NotFound("Movie")));
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = MemoryReviewStore::new();
        let movie = store.insert_movie(NewMovie::titled("Heat")).await.unwrap().unwrap();
        for minute in [5, 1, 9] {
            store.insert_review(new_review(movie.id, 1, 3, minute)).await.unwrap();
        }

        let listed = store
            .list_reviews(ReviewFilter::for_movie(movie.id), page(10))
            .await
            .unwrap();
        let minutes: Vec<_> = listed
            .items
            .iter()
            .map(|r| r.created_at.timestamp() / 60 % 60)
            .collect();
        assert_eq!(minutes, [9, 5, 1]);
    }

    #[tokio::test]
    async fn test_failed_refresh_rolls_back_insert() {
        let store = MemoryReviewStore::new();
        let movie = store.insert_movie(NewMovie::titled("Heat")).await.unwrap().unwrap();
        store.insert_review(new_review(movie.id, 1, 4, 0)).await.unwrap();

        store.fail_next_refresh();
        let result = store.insert_review(new_review(movie.id, 2, 1, 1)).await;

        assert!(matches!(result, Err(ReviewError::DatabaseError(_))));
        assert_eq!(store.review_count(), 1);
        let movie = store.get_movie(movie.id).await.unwrap().unwrap();
        assert_eq!(movie.review_count, 1);
        assert_eq!(movie.average_rating.unwrap().hundredths(), 400);
    }

    #[tokio::test]
    async fn test_failed_refresh_rolls_back_update_and_delete() {
        let store = MemoryReviewStore::new();
        let movie = store.insert_movie(NewMovie::titled("Heat")).await.unwrap().unwrap();
        let commit = store.insert_review(new_review(movie.id, 1, 4, 0)).await.unwrap();
        let change = ReviewChange {
            content: "changed".into(),
            rating: Rating::new(1).unwrap(),
            updated_at: Utc::now(),
        };

        store.fail_next_refresh();
        assert!(store.update_review(commit.review.id, change, allow).await.is_err());
        store.fail_next_refresh();
        assert!(store.delete_review(commit.review.id, allow).await.is_err());

        let review = store.get_review(commit.review.id).await.unwrap().unwrap();
        assert_eq!(review, commit.review);
        let movie = store.get_movie(movie.id).await.unwrap().unwrap();
        assert_eq!(movie.rating(), commit.rating);
    }

    #[tokio::test]
    async fn test_guard_rejection_leaves_review_untouched() {
        let store = MemoryReviewStore::new();
        let movie = store.insert_movie(NewMovie::titled("Heat")).await.unwrap().unwrap();
        let commit = store.insert_review(new_review(movie.id, 1, 4, 0)).await.unwrap();

        let result = store
            .delete_review(commit.review.id, |_: &Review| Err(ReviewError::Forbidden))
            .await;

        assert_eq!(result, Err(ReviewError::Forbidden));
        assert!(store.get_review(commit.review.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleted_review_is_gone() {
        let store = MemoryReviewStore::new();
        let movie = store.insert_movie(NewMovie::titled("Heat")).await.unwrap().unwrap();
        let commit = store.insert_review(new_review(movie.id, 1, 4, 0)).await.unwrap();

        let deleted = store.delete_review(commit.review.id, allow).await.unwrap();

        assert_eq!(deleted.rating, RatingSummary::EMPTY);
        assert_eq!(store.get_review(commit.review.id).await.unwrap(), None);
        assert_eq!(
            store.delete_review(commit.review.id, allow).await,
            Err(ReviewError::NotFound("Review"))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_all_counted() {
        let store = MemoryReviewStore::new();
        let movie = store.insert_movie(NewMovie::titled("Heat")).await.unwrap().unwrap();
        let movie_id = movie.id;

        let mut tasks = Vec::new();
        for i in 0..64 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .insert_review(new_review(movie_id, i, i % 5 + 1, i))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let movie = store.get_movie(movie_id).await.unwrap().unwrap();
        assert_eq!(movie.review_count, 64);
        // 64 ratings cycling 1..=5: sum = 12 * 15 + (1 + 2 + 3 + 4) = 190
        assert_eq!(movie.rating(), RatingSummary::from_totals(190, 64).unwrap());
    }
}
