//! Configuration management for the Cinereview server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A `.env` file is read by the binary before [`Config::from_env`] runs.

use chrono::Duration;
use cinereview_auth::AuthConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Signing key used when `AUTH_TOKEN_SECRET` is not set. Development only.
pub const DEVELOPMENT_TOKEN_SECRET: &str = "cinereview-development-secret-change-me";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token and password configuration
    pub auth: AuthSettings,
    /// Optional JSON file of movie records ingested at startup
    pub catalog_seed_path: Option<PathBuf>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL. Without it the in-memory backend is used.
    pub url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthSettings {
    /// HMAC key for signing bearer tokens
    pub token_secret: String,
    /// Token lifetime in hours (default: 24)
    pub token_ttl_hours: i64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl AuthSettings {
    /// Whether the development signing key is in use.
    #[must_use]
    pub fn uses_development_secret(&self) -> bool {
        self.token_secret == DEVELOPMENT_TOKEN_SECRET
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparsable numbers fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse(&lookup, "PORT").unwrap_or(8080),
                log_level: lookup("RUST_LOG")
                    .unwrap_or_else(|| "info,cinereview=debug,sqlx=warn".to_string()),
                shutdown_timeout: parse(&lookup, "SHUTDOWN_TIMEOUT").unwrap_or(30),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
                max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            },
            auth: AuthSettings {
                token_secret: lookup("AUTH_TOKEN_SECRET")
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEVELOPMENT_TOKEN_SECRET.to_string()),
                token_ttl_hours: parse(&lookup, "AUTH_TOKEN_TTL_HOURS")
                    .filter(|hours: &i64| *hours > 0)
                    .unwrap_or(24),
            },
            catalog_seed_path: lookup("CATALOG_SEED_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Address to bind, `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Credential service configuration.
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.auth.token_secret.clone())
            .with_token_ttl(Duration::hours(self.auth.token_ttl_hours))
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}
