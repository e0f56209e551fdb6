//! # Cinereview Authentication
//!
//! Credential store, password verification and bearer tokens.
//!
//! ## Features
//!
//! - **Registration**: validated email/password/nickname, Argon2id hashing
//! - **Login**: uniform `InvalidCredentials` for unknown email and wrong
//!   password, so account existence is never revealed
//! - **Bearer tokens**: HS256, 24 hour default lifetime, verifiable from the
//!   token alone; expiry is checked against an injected clock
//! - **Access gate**: `require_auth` / `optional_auth` resolve an
//!   `Authorization` header into an [`Identity`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use cinereview_auth::*;
//!
//! let service = CredentialService::new(users, &AuthConfig::new(secret), clock)?;
//! let identity = service.register(registration).await?;
//! let session = service.login(&email, &password).await?;
//!
//! let header = format!("Bearer {}", session.token.token);
//! let same = service.require_auth(Some(&header)).await?;
//! assert_eq!(same, identity);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod error;
pub mod password;
pub mod providers;
pub mod service;
pub mod stores;
pub mod token;
pub mod utils;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::{AuthConfig, HashCost};
pub use error::{AuthError, Result};
pub use providers::{Identity, User, UserRepository, UserSummary};
pub use service::{CredentialService, Registration, Session};
pub use token::{IssuedToken, TokenIssuer};
