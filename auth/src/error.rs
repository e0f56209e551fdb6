//! Error types for credential and token operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of the credential store, verifier and access gate.
///
/// Token failures are kept distinct so the HTTP layer can report each kind
/// separately. Login failures are deliberately collapsed into
/// [`AuthError::InvalidCredentials`] whether the email is unknown or the
/// password does not match.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Access Gate
    // ═══════════════════════════════════════════════════════════

    /// No bearer token was presented.
    #[error("Access token required")]
    MissingToken,

    /// Token is malformed or its signature does not verify.
    #[error("Invalid access token")]
    InvalidToken,

    /// Token verified but its validity window has passed.
    #[error("Access token has expired")]
    ExpiredToken,

    /// Token verified but the identity it names no longer exists.
    #[error("Unknown identity")]
    UnknownIdentity,

    // ═══════════════════════════════════════════════════════════
    // Credentials
    // ═══════════════════════════════════════════════════════════

    /// Registration attempted with an email that is already taken.
    #[error("Email is already registered")]
    DuplicateIdentity,

    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error")]
    InternalError,
}

impl AuthError {
    /// Returns `true` if this error rejects a request at the access gate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cinereview_auth::AuthError;
    /// assert!(AuthError::ExpiredToken.is_unauthorized());
    /// assert!(!AuthError::DuplicateIdentity.is_unauthorized());
    /// ```
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::InvalidToken
                | Self::ExpiredToken
                | Self::UnknownIdentity
                | Self::InvalidCredentials
        )
    }

    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cinereview_auth::AuthError;
    /// assert!(AuthError::Validation("nickname is required".into()).is_user_error());
    /// assert!(!AuthError::InternalError.is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::DuplicateIdentity)
    }
}
