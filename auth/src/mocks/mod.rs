//! In-memory provider implementations.
//!
//! Used by tests and by the server when no database is configured.

pub mod user;

pub use user::MemoryUserRepository;
