//! Credential configuration.
//!
//! The token signing key is provided by the application at startup and
//! injected into the service; nothing here reads the environment.

use chrono::Duration;
use std::fmt;

/// Default bearer token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl HashCost {
    /// Argon2id defaults recommended by the `argon2` crate.
    pub const RECOMMENDED: Self = Self {
        memory_kib: argon2::Params::DEFAULT_M_COST,
        iterations: argon2::Params::DEFAULT_T_COST,
        parallelism: argon2::Params::DEFAULT_P_COST,
    };

    /// Minimal parameters for tests. Never use in production.
    pub const INSECURE_FAST: Self = Self {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
}

impl Default for HashCost {
    fn default() -> Self {
        Self::RECOMMENDED
    }
}

/// Credential store and token configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key used to sign bearer tokens.
    pub token_secret: String,

    /// Lifetime of an issued token.
    ///
    /// Default: 24 hours
    pub token_ttl: Duration,

    /// Password hashing cost.
    pub hash_cost: HashCost,
}

impl AuthConfig {
    /// Create configuration with the given signing key and default lifetime.
    #[must_use]
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            hash_cost: HashCost::default(),
        }
    }

    /// Set token lifetime.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set password hashing cost.
    #[must_use]
    pub const fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }
}

// The signing key must never end up in logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new("secret");
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert_eq!(config.hash_cost, HashCost::RECOMMENDED);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::new("super-secret-key");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
