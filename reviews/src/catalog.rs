//! Catalog store operations and the ingestion boundary for the external
//! movie metadata job.

use crate::aggregate::RatingSummary;
use crate::error::{ReviewError, Result};
use crate::models::{Movie, MovieSummary, NewMovie};
use crate::providers::CatalogRepository;
use cinereview_core::{MovieId, Page, PageRequest};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of ingesting a batch of movie records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Records stored as new movies.
    pub inserted: usize,
    /// Records skipped because the title already exists.
    pub skipped: usize,
    /// Records rejected by validation.
    pub rejected: usize,
}

/// Read-mostly movie catalog.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CatalogRepository> CatalogService<S> {
    /// Create a service over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List movies, optionally searching titles. A blank search lists all.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Page<Movie>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.store.list_movies(search, page).await
    }

    /// Get a movie.
    ///
    /// # Errors
    ///
    /// `ReviewError::NotFound` if absent.
    pub async fn get(&self, movie_id: MovieId) -> Result<Movie> {
        self.store
            .get_movie(movie_id)
            .await?
            .ok_or(ReviewError::NotFound("Movie"))
    }

    /// A movie's stored aggregate.
    ///
    /// # Errors
    ///
    /// `ReviewError::NotFound` if the movie is absent.
    pub async fn rating(&self, movie_id: MovieId) -> Result<RatingSummary> {
        Ok(self.get(movie_id).await?.rating())
    }

    /// Summaries for the given movies.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn summaries(&self, movie_ids: &[MovieId]) -> Result<Vec<MovieSummary>> {
        self.store.get_movie_summaries(movie_ids).await
    }

    /// Store movie records, skipping titles already in the catalog.
    ///
    /// Invalid records are counted and skipped; the batch continues.
    ///
    /// # Errors
    ///
    /// Storage failures abort the batch; records already stored remain.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub async fn ingest(&self, records: Vec<NewMovie>) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for record in records {
            if let Err(e) = record.validate() {
                tracing::warn!(title = %record.title, error = %e, "movie record rejected");
                report.rejected += 1;
                continue;
            }
            match self.store.insert_movie(record).await? {
                Some(movie) => {
                    tracing::debug!(movie_id = %movie.id, title = %movie.title, "movie stored");
                    report.inserted += 1;
                }
                None => report.skipped += 1,
            }
        }

        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            rejected = report.rejected,
            "catalog ingest finished"
        );
        Ok(report)
    }
}
