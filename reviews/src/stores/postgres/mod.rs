//! PostgreSQL storage implementations.
//!
//! The schema is owned by the server's migrations (`movies` and `reviews`
//! tables).

pub mod store;

pub use store::PostgresReviewStore;
