//! Credential providers.
//!
//! This module defines the storage trait the credential service depends on
//! and the records that cross it. Implementations live in
//! [`crate::mocks`] (in-memory) and `crate::stores::postgres` (PostgreSQL).

use cinereview_core::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

pub mod user;

pub use user::UserRepository;

/// Stored user record.
///
/// Only the one-way password hash is kept. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Storage-assigned identifier.
    pub id: UserId,
    /// Unique, case-sensitive email.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Display name.
    pub nickname: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The public identity of this user.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            nickname: self.nickname.clone(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// User record about to be inserted. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    /// Unique email.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Display name.
    pub nickname: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Authenticated user's resolved reference, attached to requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// User identifier.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub nickname: String,
}

/// Public part of a user shown next to content they wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub nickname: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname.clone(),
        }
    }
}
