//! Persistent storage implementations.
//!
//! - **Catalog & Review Store** (PostgreSQL) - feature `postgres`

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresReviewStore;
