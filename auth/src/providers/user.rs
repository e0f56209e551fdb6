//! User repository trait.

use super::{NewUser, User, UserSummary};
use crate::error::Result;
use cinereview_core::UserId;
use std::future::Future;

/// User repository.
///
/// This trait abstracts over user persistence (PostgreSQL or in-memory).
/// Lookups return `Ok(None)` for absent users; interpretation of absence is
/// left to the caller.
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new user and assign its identifier.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Email already exists → `AuthError::DuplicateIdentity`
    /// - Database query fails
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User>> + Send;

    /// Get user by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn get_user_by_id(&self, user_id: UserId) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Get user by exact (case-sensitive) email.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn get_user_by_email(&self, email: &str)
    -> impl Future<Output = Result<Option<User>>> + Send;

    /// Public summaries for a batch of users. Unknown ids are omitted.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn get_user_summaries(
        &self,
        user_ids: &[UserId],
    ) -> impl Future<Output = Result<Vec<UserSummary>>> + Send;
}
