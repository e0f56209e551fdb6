//! Error types for catalog and review operations.

use cinereview_core::PageRequestError;
use thiserror::Error;

/// Result type alias for review operations.
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Failure modes of the catalog, review store and rating aggregator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// Input failed validation (content, rating, movie reference, paging).
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authenticated, but not the owner of the review.
    #[error("Only the author may modify this review")]
    Forbidden,

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error")]
    InternalError,
}

impl ReviewError {
    /// Validation failure with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns `true` for storage or internal failures.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cinereview_reviews::ReviewError;
    /// assert!(ReviewError::DatabaseError("down".into()).is_internal());
    /// assert!(!ReviewError::Forbidden.is_internal());
    /// ```
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::InternalError)
    }
}

impl From<PageRequestError> for ReviewError {
    fn from(e: PageRequestError) -> Self {
        Self::Validation(e.to_string())
    }
}
