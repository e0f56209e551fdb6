//! # Cinereview Core
//!
//! Shared vocabulary for the Cinereview service crates.
//!
//! This crate has no I/O. It provides:
//!
//! - **Identifiers**: `UserId`, `MovieId`, `ReviewId` newtypes over the
//!   storage-assigned integer keys
//! - **Environment**: the [`environment::Clock`] trait so that token expiry and
//!   review timestamps can be driven deterministically in tests
//! - **Pagination**: 1-indexed [`pagination::PageRequest`] and the
//!   [`pagination::Pagination`] summary returned by every listing endpoint

pub mod environment;
pub mod ids;
pub mod pagination;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use environment::{Clock, SystemClock};
pub use ids::{MovieId, ReviewId, UserId};
pub use pagination::{Page, PageRequest, PageRequestError, Pagination};
