//! Storage traits for the catalog and review store.
//!
//! Both traits are implemented by [`crate::mocks::MemoryReviewStore`] and by
//! `crate::stores::postgres::PostgresReviewStore`. Every review mutation is
//! one unit with the recomputation of its movie's aggregate: either both are
//! committed or neither is, and mutations of the same movie are serialized.

pub mod catalog;
pub mod review;

pub use catalog::CatalogRepository;
pub use review::{ReviewGuard, ReviewRepository};
