//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and an expiry. Validity is
//! checked from the token alone; the expiry comparison uses the injected
//! [`Clock`] rather than the system time.

use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use cinereview_core::environment::SharedClock;
use cinereview_core::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims carried by a bearer token.
///
/// `iat` and `exp` are the registered whole-second claims (`exp` rounded up).
/// `expires_at` keeps the full-precision expiry that validation uses, so a
/// token issued part way through a second lives exactly one ttl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Exact expiry instant.
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// A freshly issued token and its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token, sent as `Authorization: Bearer <token>`.
    pub token: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: SharedClock,
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration, clock: SharedClock) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` valid from now until now + ttl.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken> {
        let issued_at = self.clock.now();
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.get(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp() + i64::from(expires_at.timestamp_subsec_nanos() > 0),
            expires_at,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to sign token");
                AuthError::InternalError
            })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and expiry, returning the user id the token names.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidToken` if the token is malformed or its signature
    ///   does not verify
    /// - `AuthError::ExpiredToken` if the current time is at or past the
    ///   expiry
    pub fn validate(&self, token: &str) -> Result<UserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            },
        )?;

        if self.clock.now() >= data.claims.expires_at {
            return Err(AuthError::ExpiredToken);
        }

        Ok(UserId::new(data.claims.sub))
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
