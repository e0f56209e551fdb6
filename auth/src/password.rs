//! Argon2id password hashing.
//!
//! Hashing and verification are CPU bound and run on the blocking thread
//! pool so they never stall request handling.

use crate::config::HashCost;
use crate::error::{AuthError, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// One-way password hasher producing PHC strings.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher with the given cost.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the cost parameters are rejected
    /// by Argon2.
    pub fn new(cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| {
                tracing::error!(error = %e, "invalid argon2 parameters");
                AuthError::InternalError
            })?;
        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if hashing fails or the blocking
    /// task is cancelled.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let params = self.params.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing task failed");
            AuthError::InternalError
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            AuthError::InternalError
        })
    }

    /// Check a password against a stored PHC string.
    ///
    /// The cost parameters embedded in the stored hash are used, so hashes
    /// produced with a different [`HashCost`] still verify.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the stored hash cannot be parsed
    /// or the blocking task is cancelled.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let params = self.params.clone();
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored_hash).map_err(|e| {
                tracing::error!(error = %e, "stored password hash is malformed");
                AuthError::InternalError
            })?;
            Ok(Self::argon2(params)
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password verification task failed");
            AuthError::InternalError
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashCost::INSECURE_FAST).unwrap()
    }

    #[tokio::test]
    async fn test_hash_verifies_original_password() {
        let hasher = hasher();
        let hash = hasher.hash("hunter2").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("hunter2"));
        assert!(hasher.verify("hunter2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_password_does_not_verify() {
        let hasher = hasher();
        let hash = hasher.hash("hunter2").await.unwrap();

        assert!(!hasher.verify("hunter3", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() {
        let hasher = hasher();
        let first = hasher.hash("same").await.unwrap();
        let second = hasher.hash("same").await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_stored_hash_is_internal_error() {
        let result = hasher().verify("x", "not-a-phc-string").await;
        assert_eq!(result, Err(AuthError::InternalError));
    }
}
