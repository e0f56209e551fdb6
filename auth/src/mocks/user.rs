//! In-memory user repository.

use crate::error::{AuthError, Result};
use crate::providers::{NewUser, User, UserRepository, UserSummary};
use cinereview_core::UserId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<UserId, User>,
    id_by_email: HashMap<String, UserId>,
}

/// In-memory user repository.
///
/// Both indexes live behind one mutex so the email uniqueness check and the
/// insert are atomic.
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    users: Arc<Mutex<Users>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Users::default())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Remove a user. Returns `true` if it existed.
    ///
    /// There is no account-deletion operation; this lets tests exercise
    /// tokens that outlive their user.
    pub fn remove_user(&self, user_id: UserId) -> bool {
        let Ok(mut users) = self.users.lock() else {
            return false;
        };
        match users.by_id.remove(&user_id) {
            Some(user) => {
                users.id_by_email.remove(&user.email);
                true
            }
            None => false,
        }
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.lock().map_or(0, |users| users.by_id.len())
    }

    /// Whether no users are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository for MemoryUserRepository {
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);
        let next_id = Arc::clone(&self.next_id);

        async move {
            let mut guard = users.lock().map_err(|_| AuthError::InternalError)?;

            if guard.id_by_email.contains_key(&user.email) {
                return Err(AuthError::DuplicateIdentity);
            }

            let stored = User {
                id: UserId::new(next_id.fetch_add(1, Ordering::Relaxed)),
                email: user.email,
                password_hash: user.password_hash,
                nickname: user.nickname,
                created_at: user.created_at,
            };
            guard.id_by_email.insert(stored.email.clone(), stored.id);
            guard.by_id.insert(stored.id, stored.clone());

            Ok(stored)
        }
    }

    fn get_user_by_id(&self, user_id: UserId) -> impl Future<Output = Result<Option<User>>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            Ok(users
                .lock()
                .map_err(|_| AuthError::InternalError)?
                .by_id
                .get(&user_id)
                .cloned())
        }
    }

    fn get_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        let users = Arc::clone(&self.users);
        let email = email.to_string();

        async move {
            let guard = users.lock().map_err(|_| AuthError::InternalError)?;
            Ok(guard
                .id_by_email
                .get(&email)
                .and_then(|id| guard.by_id.get(id))
                .cloned())
        }
    }

    fn get_user_summaries(
        &self,
        user_ids: &[UserId],
    ) -> impl Future<Output = Result<Vec<UserSummary>>> + Send {
        let users = Arc::clone(&self.users);
        let user_ids = user_ids.to_vec();

        async move {
            let guard = users.lock().map_err(|_| AuthError::InternalError)?;
            Ok(user_ids
                .iter()
                .filter_map(|id| guard.by_id.get(id))
                .map(UserSummary::from)
                .collect())
        }
    }
}
