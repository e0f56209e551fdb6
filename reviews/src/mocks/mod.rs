//! In-memory provider implementations.
//!
//! Used by tests and by the server when no database is configured.

pub mod store;

pub use store::MemoryReviewStore;
