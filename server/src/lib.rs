//! Cinereview HTTP service.
//!
//! Users register and log in, browse the movie catalog and post star-rated
//! reviews. Every review mutation refreshes the reviewed movie's average
//! rating before the response is sent, so a client always reads back an
//! aggregate that reflects its own writes.
//!
//! # Architecture
//!
//! ```text
//! HTTP ──► gate (CurrentUser / MaybeUser) ──► api handlers
//!                                               │
//!            CredentialService ◄────────────────┤
//!            ReviewService / CatalogService ◄───┘
//!                    │
//!            UserRepository, ReviewRepository + CatalogRepository
//!            (in-memory or PostgreSQL)
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod config;
pub mod gate;
pub mod routes;
pub mod seed;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
