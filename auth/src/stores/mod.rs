//! Persistent storage implementations.
//!
//! - **User Store** (PostgreSQL) - user accounts, feature `postgres`

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresUserRepository;
