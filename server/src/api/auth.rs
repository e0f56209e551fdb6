//! Account endpoints:
//! - POST /api/auth/register - Create an account
//! - POST /api/auth/login - Exchange credentials for a bearer token
//! - GET /api/auth/me - The caller's identity (requires auth)

use crate::gate::CurrentUser;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use cinereview_auth::{Identity, Registration, UserRepository};
use cinereview_web::{AppError, JsonBody};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to register a user.
#[derive(Deserialize)]
pub struct RegisterRequest {
    /// Email, used as the login name
    pub email: String,
    /// Password
    pub password: String,
    /// Display name
    pub nickname: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .finish_non_exhaustive()
    }
}

/// Request to log in.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Email
    pub email: String,
    /// Password
    pub password: String,
}

/// Response to a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Always `"Bearer"`
    pub token_type: &'static str,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Who logged in
    pub user: Identity,
}

/// Register a new account.
///
/// # Errors
///
/// `409 DUPLICATE_IDENTITY` for a taken email, `422` for invalid input.
pub async fn register<U, S>(
    State(state): State<AppState<U, S>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Identity>), AppError>
where
    U: UserRepository,
{
    let identity = state
        .credentials
        .register(Registration {
            email: request.email,
            password: request.password,
            nickname: request.nickname,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(identity)))
}

/// Log in.
///
/// # Errors
///
/// `401 INVALID_CREDENTIALS` for an unknown email or a wrong password.
pub async fn login<U, S>(
    State(state): State<AppState<U, S>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError>
where
    U: UserRepository,
{
    let session = state
        .credentials
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token.token,
        token_type: "Bearer",
        expires_at: session.token.expires_at,
        user: session.identity,
    }))
}

/// The authenticated caller.
#[allow(clippy::unused_async)]
pub async fn me(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}
