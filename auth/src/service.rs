//! Credential service: registration, login and token resolution.
//!
//! This is the transport-neutral half of the access gate. The HTTP layer
//! passes the raw `Authorization` header value to [`CredentialService::require_auth`]
//! or [`CredentialService::optional_auth`] and gets back an [`Identity`].

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;
use crate::providers::{Identity, NewUser, UserRepository};
use crate::token::{IssuedToken, TokenIssuer};
use crate::utils::{MAX_NICKNAME_LEN, is_valid_email, parse_bearer};
use cinereview_core::environment::SharedClock;
use cinereview_core::UserId;
use std::sync::Arc;

/// Registration input.
#[derive(Clone)]
pub struct Registration {
    /// Email, used as the login name.
    pub email: String,
    /// Plain-text password. Hashed before storage.
    pub password: String,
    /// Display name.
    pub nickname: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token.
    pub token: IssuedToken,
    /// Who the token belongs to.
    pub identity: Identity,
}

/// Credential store and verifier.
pub struct CredentialService<U> {
    users: Arc<U>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    clock: SharedClock,
}

impl<U> Clone for CredentialService<U> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: self.hasher.clone(),
            tokens: self.tokens.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U: UserRepository> CredentialService<U> {
    /// Create a service over `users`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the configured hash cost is
    /// rejected.
    pub fn new(users: Arc<U>, config: &AuthConfig, clock: SharedClock) -> Result<Self> {
        Ok(Self {
            users,
            hasher: PasswordHasher::new(config.hash_cost)?,
            tokens: TokenIssuer::new(
                config.token_secret.as_bytes(),
                config.token_ttl,
                Arc::clone(&clock),
            ),
            clock,
        })
    }

    /// The backing user repository.
    #[must_use]
    pub fn users(&self) -> &U {
        &self.users
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation` for a malformed email, empty password or a
    ///   nickname that is empty or longer than 50 characters
    /// - `AuthError::DuplicateIdentity` if the email is taken
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<Identity> {
        let Registration {
            email,
            password,
            nickname,
        } = registration;
        let nickname = nickname.trim().to_owned();

        validate_registration(&email, &password, &nickname)?;

        if self.users.get_user_by_email(&email).await?.is_some() {
            tracing::debug!("registration rejected: email taken");
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.hasher.hash(&password).await?;
        let user = self
            .users
            .create_user(NewUser {
                email,
                password_hash,
                nickname,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.identity())
    }

    /// Verify login credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email and for a
    /// wrong password alike.
    #[tracing::instrument(skip(self, password))]
    pub async fn verify(&self, email: &str, password: &str) -> Result<Identity> {
        let Some(user) = self.users.get_user_by_email(email).await? else {
            tracing::debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user.identity())
    }

    /// Issue a bearer token bound to `identity`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if signing fails.
    pub fn issue_token(&self, identity: &Identity) -> Result<IssuedToken> {
        self.tokens.issue(identity.id)
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    ///
    /// Same as [`CredentialService::verify`] and [`CredentialService::issue_token`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let identity = self.verify(email, password).await?;
        let token = self.issue_token(&identity)?;
        tracing::info!(user_id = %identity.id, "user logged in");
        Ok(Session { token, identity })
    }

    /// Resolve a bearer token into the identity it names.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidToken` for malformed or foreign tokens
    /// - `AuthError::ExpiredToken` once the validity window has passed
    /// - `AuthError::UnknownIdentity` if the user no longer exists
    pub async fn resolve_token(&self, token: &str) -> Result<Identity> {
        let user_id: UserId = self.tokens.validate(token)?;

        self.users
            .get_user_by_id(user_id)
            .await?
            .map(|user| user.identity())
            .ok_or(AuthError::UnknownIdentity)
    }

    /// Resolve an `Authorization` header value, rejecting on any failure.
    ///
    /// # Errors
    ///
    /// `AuthError::MissingToken` when no bearer token is present, otherwise
    /// the errors of [`CredentialService::resolve_token`].
    pub async fn require_auth(&self, authorization: Option<&str>) -> Result<Identity> {
        let token = authorization
            .and_then(parse_bearer)
            .ok_or(AuthError::MissingToken)?;

        self.resolve_token(token).await.inspect_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
        })
    }

    /// Resolve an `Authorization` header value if possible. Never rejects.
    pub async fn optional_auth(&self, authorization: Option<&str>) -> Option<Identity> {
        let token = authorization.and_then(parse_bearer)?;

        match self.resolve_token(token).await {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unusable bearer token");
                None
            }
        }
    }
}

fn validate_registration(email: &str, password: &str, nickname: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(AuthError::Validation("email is not a valid address".into()));
    }
    if password.is_empty() {
        return Err(AuthError::Validation("password is required".into()));
    }
    if nickname.is_empty() {
        return Err(AuthError::Validation("nickname is required".into()));
    }
    if nickname.chars().count() > MAX_NICKNAME_LEN {
        return Err(AuthError::Validation(format!(
            "nickname must be at most {MAX_NICKNAME_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashCost;
    use crate::mocks::MemoryUserRepository;
    use chrono::Duration;
    use cinereview_testing::MockClock;

    fn service(clock: &MockClock) -> CredentialService<MemoryUserRepository> {
        let config = AuthConfig::new("test-secret").with_hash_cost(HashCost::INSECURE_FAST);
        CredentialService::new(
            Arc::new(MemoryUserRepository::new()),
            &config,
            Arc::new(clock.clone()),
        )
        .unwrap()
    }

    fn alice() -> Registration {
        Registration {
            email: "alice@example.com".into(),
            password: "correct horse".into(),
            nickname: "alice".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let clock = MockClock::default();
        let service = service(&clock);

        let identity = service.register(alice()).await.unwrap();
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.nickname, "alice");

        let session = service
            .login("alice@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(session.identity, identity);

        let resolved = service.resolve_token(&session.token.token).await.unwrap();
        assert_eq!(resolved, identity);
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let clock = MockClock::default();
        let service = service(&clock);
        service.register(alice()).await.unwrap();

        let stored = service
            .users()
            .get_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "correct horse");
        assert!(!format!("{stored:?}").contains(&stored.password_hash));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let clock = MockClock::default();
        let service = service(&clock);
        service.register(alice()).await.unwrap();

        let mut again = alice();
        again.nickname = "other".into();
        assert_eq!(
            service.register(again).await,
            Err(AuthError::DuplicateIdentity)
        );
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let clock = MockClock::default();
        let service = service(&clock);
        service.register(alice()).await.unwrap();

        let wrong_password = service.login("alice@example.com", "nope").await.unwrap_err();
        let unknown_email = service.login("bob@example.com", "nope").await.unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(unknown_email, AuthError::InvalidCredentials);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let clock = MockClock::default();
        let service = service(&clock);
        service.register(alice()).await.unwrap();

        assert_eq!(
            service
                .login("Alice@example.com", "correct horse")
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_registration_validation() {
        let clock = MockClock::default();
        let service = service(&clock);

        let mut bad_email = alice();
        bad_email.email = "not-an-email".into();
        assert!(matches!(
            service.register(bad_email).await,
            Err(AuthError::Validation(_))
        ));

        let mut empty_password = alice();
        empty_password.password = String::new();
        assert!(matches!(
            service.register(empty_password).await,
            Err(AuthError::Validation(_))
        ));

        let mut blank_nickname = alice();
        blank_nickname.nickname = "   ".into();
        assert!(matches!(
            service.register(blank_nickname).await,
            Err(AuthError::Validation(_))
        ));

        let mut long_nickname = alice();
        long_nickname.nickname = "n".repeat(51);
        assert!(matches!(
            service.register(long_nickname).await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_token_expires_after_ttl() {
        let clock = MockClock::default();
        let service = service(&clock);
        service.register(alice()).await.unwrap();
        let session = service
            .login("alice@example.com", "correct horse")
            .await
            .unwrap();
        let header = format!("Bearer {}", session.token.token);

        clock.advance(Duration::hours(23) + Duration::minutes(59));
        assert!(service.require_auth(Some(&header)).await.is_ok());

        clock.advance(Duration::minutes(1));
        assert_eq!(
            service.require_auth(Some(&header)).await,
            Err(AuthError::ExpiredToken)
        );
        assert_eq!(service.optional_auth(Some(&header)).await, None);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_unknown_identity() {
        let clock = MockClock::default();
        let service = service(&clock);
        let identity = service.register(alice()).await.unwrap();
        let token = service.issue_token(&identity).unwrap();

        service.users().remove_user(identity.id);

        assert_eq!(
            service.resolve_token(&token.token).await,
            Err(AuthError::UnknownIdentity)
        );
    }

    #[tokio::test]
    async fn test_require_auth_without_header() {
        let clock = MockClock::default();
        let service = service(&clock);

        assert_eq!(service.require_auth(None).await, Err(AuthError::MissingToken));
        assert_eq!(
            service.require_auth(Some("Basic abc")).await,
            Err(AuthError::MissingToken)
        );
        assert_eq!(
            service.require_auth(Some("Bearer garbage")).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_optional_auth_never_rejects() {
        let clock = MockClock::default();
        let service = service(&clock);

        assert_eq!(service.optional_auth(None).await, None);
        assert_eq!(service.optional_auth(Some("Bearer garbage")).await, None);
    }
}
