//! PostgreSQL storage implementations.
//!
//! The schema is owned by the server's migrations (`users` table).

pub mod user;

pub use user::PostgresUserRepository;
