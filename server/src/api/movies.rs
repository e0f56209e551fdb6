//! Catalog endpoints:
//! - GET /api/movies - List movies, optionally searching titles
//! - GET /api/movies/:id - Movie details
//! - GET /api/movies/:id/rating - Stored aggregate of a movie

use super::{MOVIES_PAGE_LIMIT, page_request};
use crate::state::AppState;
use axum::{Json, extract::State};
use cinereview_core::MovieId;
use cinereview_reviews::{AverageRating, CatalogRepository, Movie};
use cinereview_web::{AppError, PathParam, QueryParams};
use serde::{Deserialize, Serialize};

/// Query parameters for listing movies.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMoviesQuery {
    /// 1-indexed page number (default: 1)
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100)
    pub limit: Option<u32>,
    /// Case-insensitive substring of the title
    pub search_term: Option<String>,
}

/// Response for listing movies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMoviesResponse {
    /// Movies on this page
    pub movies: Vec<Movie>,
    /// Number of matching movies
    pub total: u64,
    /// Current page
    pub current_page: u32,
    /// Number of pages
    pub total_pages: u64,
}

/// Response for a movie's aggregate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRatingResponse {
    /// Movie
    pub movie_id: MovieId,
    /// Mean rating, `null` without reviews
    pub average_rating: Option<AverageRating>,
    /// Number of reviews
    pub review_count: u64,
}

/// List movies.
///
/// # Errors
///
/// `422` for an invalid page or limit.
pub async fn list_movies<U, S>(
    State(state): State<AppState<U, S>>,
    QueryParams(query): QueryParams<ListMoviesQuery>,
) -> Result<Json<ListMoviesResponse>, AppError>
where
    S: CatalogRepository,
{
    let request = page_request(query.page, query.limit, MOVIES_PAGE_LIMIT)?;
    let page = state
        .catalog
        .list(query.search_term.as_deref(), request)
        .await?;

    let total_pages = page.total_pages();
    Ok(Json(ListMoviesResponse {
        total: page.total,
        current_page: request.page(),
        total_pages,
        movies: page.items,
    }))
}

/// Get a movie.
///
/// # Errors
///
/// `404` if the movie does not exist.
pub async fn get_movie<U, S>(
    State(state): State<AppState<U, S>>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Movie>, AppError>
where
    S: CatalogRepository,
{
    let movie = state.catalog.get(MovieId::new(id)).await?;
    Ok(Json(movie))
}

/// Get a movie's stored aggregate.
///
/// # Errors
///
/// `404` if the movie does not exist.
pub async fn get_movie_rating<U, S>(
    State(state): State<AppState<U, S>>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MovieRatingResponse>, AppError>
where
    S: CatalogRepository,
{
    let movie_id = MovieId::new(id);
    let rating = state.catalog.rating(movie_id).await?;

    Ok(Json(MovieRatingResponse {
        movie_id,
        average_rating: rating.average_rating,
        review_count: rating.review_count,
    }))
}
