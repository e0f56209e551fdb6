//! Review endpoints:
//! - GET /api/reviews - List reviews, optionally of one movie (optional auth)
//! - GET /api/reviews/my - The caller's reviews (requires auth)
//! - GET /api/reviews/:id - One review (optional auth)
//! - POST /api/reviews - Create a review (requires auth)
//! - PUT /api/reviews/:id - Replace content and rating (author only)
//! - DELETE /api/reviews/:id - Delete (author only)
//!
//! Mutation responses carry the movie's refreshed aggregate as
//! `movieRating`.

use super::{REVIEWS_PAGE_LIMIT, page_request};
use crate::gate::{CurrentUser, MaybeUser};
use crate::state::AppState;
use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use cinereview_auth::{UserRepository, UserSummary};
use cinereview_core::{MovieId, Page, Pagination, ReviewId, UserId};
use cinereview_reviews::{
    CatalogRepository, MovieSummary, RatingSummary, Review, ReviewCommit, ReviewFilter,
    ReviewInput, ReviewRepository,
};
use cinereview_web::{AppError, JsonBody, PathParam, QueryParams};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing all reviews or one movie's reviews.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsQuery {
    /// Only reviews of this movie
    pub movie_id: Option<i64>,
    /// 1-indexed page number (default: 1)
    pub page: Option<u32>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<u32>,
}

/// Query parameters for listing the caller's reviews.
#[derive(Debug, Default, Deserialize)]
pub struct MyReviewsQuery {
    /// 1-indexed page number (default: 1)
    pub page: Option<u32>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<u32>,
}

/// Request to create a review.
///
/// `rating` stays raw JSON so non-integers are reported as validation
/// errors rather than parse failures.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    /// Review text
    #[serde(default)]
    pub content: Option<String>,
    /// Star rating, an integer in `1..=5`
    #[serde(default)]
    pub rating: Option<serde_json::Value>,
    /// Reviewed movie
    #[serde(default)]
    pub movie_id: Option<serde_json::Value>,
}

/// A review as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    /// The review
    #[serde(flatten)]
    pub review: Review,
    /// Author, `null` if the account no longer exists
    pub author: Option<UserSummary>,
    /// Reviewed movie, only in the caller's own listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<MovieSummary>,
    /// Whether the caller wrote it, only when the caller is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mine: Option<bool>,
}

/// A page of reviews.
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    /// Reviews on this page, newest first
    pub reviews: Vec<ReviewView>,
    /// Paging summary
    pub pagination: Pagination,
}

/// Response to a create or update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMutationResponse {
    /// The stored review
    #[serde(flatten)]
    pub review: ReviewView,
    /// The movie's aggregate after the change
    pub movie_rating: RatingSummary,
}

/// Response to a delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReviewResponse {
    /// Always `true`
    pub deleted: bool,
    /// The deleted review
    pub review_id: ReviewId,
    /// The movie's aggregate after the change
    pub movie_rating: RatingSummary,
}

// ============================================================================
// Handlers
// ============================================================================

/// List reviews, newest first.
///
/// # Errors
///
/// `422` for invalid paging.
pub async fn list_reviews<U, S>(
    State(state): State<AppState<U, S>>,
    viewer: MaybeUser,
    QueryParams(query): QueryParams<ListReviewsQuery>,
) -> Result<Json<ReviewListResponse>, AppError>
where
    U: UserRepository,
    S: ReviewRepository,
{
    let request = page_request(query.page, query.limit, REVIEWS_PAGE_LIMIT)?;
    let filter = query
        .movie_id
        .map_or_else(ReviewFilter::default, |id| ReviewFilter::for_movie(MovieId::new(id)));

    let page = state.reviews.list(filter, request).await?;
    let authors = author_summaries(&state, &page.items).await?;

    Ok(Json(into_list(page, |review| {
        view(review, &authors, &viewer)
    })))
}

/// List the caller's reviews with the reviewed movies.
///
/// # Errors
///
/// `401` without a valid token, `422` for invalid paging.
pub async fn list_my_reviews<U, S>(
    State(state): State<AppState<U, S>>,
    CurrentUser(identity): CurrentUser,
    QueryParams(query): QueryParams<MyReviewsQuery>,
) -> Result<Json<ReviewListResponse>, AppError>
where
    U: UserRepository,
    S: ReviewRepository + CatalogRepository,
{
    let request = page_request(query.page, query.limit, REVIEWS_PAGE_LIMIT)?;
    let page = state
        .reviews
        .list(ReviewFilter::by_author(identity.id), request)
        .await?;

    let mut movie_ids: Vec<MovieId> = page.items.iter().map(|r| r.movie_id).collect();
    movie_ids.sort_unstable();
    movie_ids.dedup();
    let movies: HashMap<MovieId, MovieSummary> = state
        .catalog
        .summaries(&movie_ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let author = UserSummary {
        id: identity.id,
        nickname: identity.nickname.clone(),
    };
    Ok(Json(into_list(page, |review| ReviewView {
        movie: movies.get(&review.movie_id).cloned(),
        author: Some(author.clone()),
        is_mine: Some(true),
        review,
    })))
}

/// Get one review.
///
/// # Errors
///
/// `404` if the review does not exist.
pub async fn get_review<U, S>(
    State(state): State<AppState<U, S>>,
    viewer: MaybeUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ReviewView>, AppError>
where
    U: UserRepository,
    S: ReviewRepository,
{
    let review = state.reviews.get(ReviewId::new(id)).await?;
    let authors = author_summaries(&state, std::slice::from_ref(&review)).await?;

    Ok(Json(view(review, &authors, &viewer)))
}

/// Create a review and refresh the movie's aggregate.
///
/// # Errors
///
/// `401` without a valid token, `422` for invalid content, rating or movie.
pub async fn create_review<U, S>(
    State(state): State<AppState<U, S>>,
    CurrentUser(identity): CurrentUser,
    JsonBody(request): JsonBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewMutationResponse>), AppError>
where
    U: UserRepository,
    S: ReviewRepository,
{
    let movie_id = parse_movie_id(request.movie_id.as_ref())?;
    let input = ReviewInput {
        content: request.content,
        rating: request.rating,
    };

    let commit = state.reviews.create(identity.id, movie_id, &input).await?;
    Ok((StatusCode::CREATED, Json(mutation_response(commit, &identity))))
}

/// Replace a review's content and rating.
///
/// The body is read raw and only parsed once the caller is known to own the
/// review.
///
/// # Errors
///
/// `404`, then `403` for a non-author, then `422` for invalid input.
pub async fn update_review<U, S>(
    State(state): State<AppState<U, S>>,
    CurrentUser(identity): CurrentUser,
    PathParam(id): PathParam<i64>,
    body: Bytes,
) -> Result<Json<ReviewMutationResponse>, AppError>
where
    U: UserRepository,
    S: ReviewRepository,
{
    let review_id = ReviewId::new(id);
    state.reviews.authorize(review_id, identity.id).await?;
    let input = ReviewInput::from_body(&body)?;

    let commit = state.reviews.update(review_id, identity.id, &input).await?;
    Ok(Json(mutation_response(commit, &identity)))
}

/// Delete a review and refresh the movie's aggregate.
///
/// # Errors
///
/// `404` if absent, `403` for a non-author.
pub async fn delete_review<U, S>(
    State(state): State<AppState<U, S>>,
    CurrentUser(identity): CurrentUser,
    PathParam(id): PathParam<i64>,
) -> Result<Json<DeleteReviewResponse>, AppError>
where
    U: UserRepository,
    S: ReviewRepository,
{
    let commit = state.reviews.delete(ReviewId::new(id), identity.id).await?;

    Ok(Json(DeleteReviewResponse {
        deleted: true,
        review_id: commit.review.id,
        movie_rating: commit.rating,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_movie_id(value: Option<&serde_json::Value>) -> Result<MovieId, AppError> {
    let value = value.ok_or_else(|| AppError::validation("movieId is required"))?;
    value
        .as_i64()
        .filter(|id| *id > 0)
        .map(MovieId::new)
        .ok_or_else(|| AppError::validation("movieId must be a positive integer"))
}

async fn author_summaries<U, S>(
    state: &AppState<U, S>,
    reviews: &[Review],
) -> Result<HashMap<UserId, UserSummary>, AppError>
where
    U: UserRepository,
{
    let mut ids: Vec<UserId> = reviews.iter().map(|r| r.author_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let summaries = state.credentials.users().get_user_summaries(&ids).await?;
    Ok(summaries.into_iter().map(|s| (s.id, s)).collect())
}

fn view(review: Review, authors: &HashMap<UserId, UserSummary>, viewer: &MaybeUser) -> ReviewView {
    ReviewView {
        author: authors.get(&review.author_id).cloned(),
        movie: None,
        is_mine: viewer.0.as_ref().map(|_| viewer.is(review.author_id)),
        review,
    }
}

fn into_list(page: Page<Review>, f: impl FnMut(Review) -> ReviewView) -> ReviewListResponse {
    let pagination = page.pagination();
    ReviewListResponse {
        reviews: page.items.into_iter().map(f).collect(),
        pagination,
    }
}

fn mutation_response(
    commit: ReviewCommit,
    identity: &cinereview_auth::Identity,
) -> ReviewMutationResponse {
    ReviewMutationResponse {
        movie_rating: commit.rating,
        review: ReviewView {
            review: commit.review,
            author: Some(UserSummary {
                id: identity.id,
                nickname: identity.nickname.clone(),
            }),
            movie: None,
            is_mine: Some(true),
        },
    }
}
