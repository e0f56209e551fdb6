//! Property tests for the rating aggregate.
//!
//! Arbitrary sequences of create, update and delete operations are applied
//! through [`ReviewService`] to one movie while a plain list of surviving
//! ratings is kept alongside. After every step the stored aggregate must
//! equal the rounded mean of that list.

use cinereview_core::{MovieId, ReviewId, UserId};
use cinereview_reviews::aggregate::summarize;
use cinereview_reviews::mocks::MemoryReviewStore;
use cinereview_reviews::{
    CatalogRepository, NewMovie, Rating, RatingAggregator, RatingSummary, ReviewError,
    ReviewInput, ReviewService,
};
use cinereview_testing::MockClock;
use cinereview_testing::properties::{invalid_rating, review_content, valid_rating};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Create { author: i64, rating: i64 },
    Update { pick: usize, rating: i64 },
    Delete { pick: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1i64..=4, valid_rating()).prop_map(|(author, rating)| Op::Create { author, rating }),
        2 => (any::<usize>(), valid_rating()).prop_map(|(pick, rating)| Op::Update { pick, rating }),
        2 => any::<usize>().prop_map(|pick| Op::Delete { pick }),
    ]
}

struct Live {
    id: ReviewId,
    author: UserId,
    rating: i64,
}

fn expected(live: &[Live]) -> RatingSummary {
    summarize(live.iter().map(|l| Rating::new(l.rating).unwrap()))
}

async fn run(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let store = Arc::new(MemoryReviewStore::new());
    let movie = store
        .insert_movie(NewMovie::titled("Heat"))
        .await
        .unwrap()
        .unwrap();
    let service = ReviewService::new(Arc::clone(&store), Arc::new(MockClock::default()));
    let aggregator = RatingAggregator::new(Arc::clone(&store));
    let mut live: Vec<Live> = Vec::new();

    for op in ops {
        match op {
            Op::Create { author, rating } => {
                let commit = service
                    .create(UserId::new(author), movie.id, &ReviewInput::new("text", rating))
                    .await
                    .unwrap();
                live.push(Live {
                    id: commit.review.id,
                    author: UserId::new(author),
                    rating,
                });
                prop_assert_eq!(commit.rating, expected(&live));
            }
            Op::Update { pick, rating } if !live.is_empty() => {
                let index = pick % live.len();
                let target = &mut live[index];
                let commit = service
                    .update(target.id, target.author, &ReviewInput::new("edited", rating))
                    .await
                    .unwrap();
                target.rating = rating;
                prop_assert_eq!(commit.rating, expected(&live));
            }
            Op::Delete { pick } if !live.is_empty() => {
                let index = pick % live.len();
                let target = live.remove(index);
                let commit = service.delete(target.id, target.author).await.unwrap();
                prop_assert_eq!(commit.rating, expected(&live));
            }
            Op::Update { .. } | Op::Delete { .. } => {}
        }

        let stored = store.get_movie(movie.id).await.unwrap().unwrap();
        prop_assert_eq!(stored.rating(), expected(&live));
    }

    // Recomputing without intervening mutations changes nothing.
    let first = aggregator.recompute(movie.id).await.unwrap();
    let second = aggregator.recompute(movie.id).await.unwrap();
    prop_assert_eq!(first, second);
    prop_assert_eq!(first, expected(&live));
    if live.is_empty() {
        prop_assert_eq!(first, RatingSummary::EMPTY);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn aggregate_tracks_surviving_reviews(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run(ops))?;
    }
}

async fn rejected_rating_leaves_aggregate(
    content: String,
    good: i64,
    bad: i64,
) -> Result<(), TestCaseError> {
    let store = Arc::new(MemoryReviewStore::new());
    let movie = store
        .insert_movie(NewMovie::titled("Heat"))
        .await
        .unwrap()
        .unwrap();
    let service = ReviewService::new(Arc::clone(&store), Arc::new(MockClock::default()));
    let author = UserId::new(1);

    let commit = service
        .create(author, movie.id, &ReviewInput::new(content.clone(), good))
        .await
        .unwrap();
    let before = commit.rating;

    let created = service
        .create(author, movie.id, &ReviewInput::new(content.clone(), bad))
        .await;
    prop_assert!(matches!(created, Err(ReviewError::Validation(_))));

    let updated = service
        .update(commit.review.id, author, &ReviewInput::new(content, bad))
        .await;
    prop_assert!(matches!(updated, Err(ReviewError::Validation(_))));

    let stored = store.get_movie(movie.id).await.unwrap().unwrap();
    prop_assert_eq!(stored.rating(), before);
    prop_assert_eq!(store.review_count(), 1);
    Ok(())
}

proptest! {
    #[test]
    fn out_of_range_ratings_are_rejected(
        content in review_content(),
        good in valid_rating(),
        bad in invalid_rating(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(rejected_rating_leaves_aggregate(content, good, bad))?;
    }
}

#[tokio::test]
async fn movie_id_unknown_to_catalog_has_no_reviews() {
    let store = Arc::new(MemoryReviewStore::new());
    let service = ReviewService::new(Arc::clone(&store), Arc::new(MockClock::default()));

    let result = service
        .create(UserId::new(1), MovieId::new(42), &ReviewInput::new("text", 3))
        .await;

    assert!(result.is_err());
    assert_eq!(store.review_count(), 0);
}
