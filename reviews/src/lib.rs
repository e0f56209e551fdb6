//! # Cinereview Reviews
//!
//! Movie catalog, reviews and per-movie rating aggregation.
//!
//! ## Consistency
//!
//! A movie's `averageRating` is derived data: it always equals the mean of
//! the ratings of the movie's current reviews, rounded half-up to two
//! decimals, or `null` without reviews. Every create, update and delete of
//! a review recomputes its movie's aggregate in the same unit as the write,
//! serialized per movie, so concurrent writers never lose an update and a
//! failed recomputation fails the whole mutation.
//!
//! ## Components
//!
//! - [`CatalogService`]: listing, search, lookup and ingestion of movies
//! - [`ReviewService`]: validated, ownership-checked review mutations
//! - [`RatingAggregator`]: on-demand recomputation and reconciliation
//! - [`providers`]: storage traits, implemented in memory
//!   ([`mocks::MemoryReviewStore`]) and for PostgreSQL (feature `postgres`)

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod aggregate;
pub mod aggregator;
pub mod catalog;
pub mod error;
pub mod models;
pub mod providers;
pub mod service;
pub mod stores;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use aggregate::{AverageRating, RatingSummary};
pub use aggregator::RatingAggregator;
pub use catalog::{CatalogService, IngestReport};
pub use error::{ReviewError, Result};
pub use models::{
    Movie, MovieSummary, NewMovie, Rating, Review, ReviewCommit, ReviewFilter, ReviewInput,
};
pub use providers::{CatalogRepository, ReviewRepository};
pub use service::ReviewService;
