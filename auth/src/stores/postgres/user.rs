//! PostgreSQL user repository implementation.
//!
//! # Example
//!
//! ```no_run
//! use cinereview_auth::stores::postgres::PostgresUserRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/cinereview").await?;
//! let repo = PostgresUserRepository::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::{NewUser, User, UserRepository, UserSummary};
use cinereview_core::UserId;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new PostgreSQL user repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str, e: &sqlx::Error) -> AuthError {
    AuthError::DatabaseError(format!("{context}: {e}"))
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let read = |e: sqlx::Error| db_error("Failed to decode user", &e);
    Ok(User {
        id: UserId::new(row.try_get("id").map_err(read)?),
        email: row.try_get("email").map_err(read)?,
        password_hash: row.try_get("password_hash").map_err(read)?,
        nickname: row.try_get("nickname").map_err(read)?,
        created_at: row.try_get("created_at").map_err(read)?,
    })
}

impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(
            r"
            INSERT INTO users (email, password_hash, nickname, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, nickname, created_at
            ",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Check for duplicate email constraint
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::DuplicateIdentity;
                }
            }
            db_error("Failed to create user", &e)
        })?;

        user_from_row(&row)
    }

    async fn get_user_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        sqlx::query(
            r"
            SELECT id, email, password_hash, nickname, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get user", &e))?
        .as_ref()
        .map(user_from_row)
        .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query(
            r"
            SELECT id, email, password_hash, nickname, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get user", &e))?
        .as_ref()
        .map(user_from_row)
        .transpose()
    }

    async fn get_user_summaries(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>> {
        let ids: Vec<i64> = user_ids.iter().map(|id| id.get()).collect();

        let rows = sqlx::query("SELECT id, nickname FROM users WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get users", &e))?;

        rows.iter()
            .map(|row| {
                Ok(UserSummary {
                    id: UserId::new(
                        row.try_get("id")
                            .map_err(|e| db_error("Failed to decode user", &e))?,
                    ),
                    nickname: row
                        .try_get("nickname")
                        .map_err(|e| db_error("Failed to decode user", &e))?,
                })
            })
            .collect()
    }
}
