//! Catalog repository trait.

use crate::error::Result;
use crate::models::{Movie, MovieSummary, NewMovie};
use cinereview_core::{MovieId, Page, PageRequest};
use std::future::Future;

/// Movie catalog storage.
pub trait CatalogRepository: Send + Sync + 'static {
    /// Insert a movie with an empty aggregate.
    ///
    /// Returns `Ok(None)` without changes if a movie with the same title
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn insert_movie(&self, movie: NewMovie) -> impl Future<Output = Result<Option<Movie>>> + Send;

    /// Get a movie by id.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn get_movie(&self, movie_id: MovieId) -> impl Future<Output = Result<Option<Movie>>> + Send;

    /// List movies by id ascending, optionally filtered by a case-insensitive
    /// title substring.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn list_movies(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Movie>>> + Send;

    /// Summaries for a batch of movies. Unknown ids are omitted.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn get_movie_summaries(
        &self,
        movie_ids: &[MovieId],
    ) -> impl Future<Output = Result<Vec<MovieSummary>>> + Send;

    /// Every movie id in the catalog, ascending.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn movie_ids(&self) -> impl Future<Output = Result<Vec<MovieId>>> + Send;
}
