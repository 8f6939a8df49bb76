//! In-memory user store.
//!
//! Persistent repositories are an external collaborator of this service; the
//! store keeps the same contract (find by email, existence check, create) so
//! a database-backed implementation can replace it without touching the
//! handlers.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use velora_shared::{
    AppError, AppResult,
    types::{Role, UserId},
};

/// A registered user account.
#[derive(Debug, Clone)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Email address (stored lowercase).
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Argon2id password hash (PHC string).
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Whether the account may log in.
    pub is_active: bool,
}

/// Concurrent in-memory user store keyed by lowercase email.
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<String, User>,
}

impl UserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if the email is already registered.
    pub fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: Role,
    ) -> AppResult<User> {
        let key = email.to_lowercase();
        let user = User {
            id: UserId::new(),
            email: key.clone(),
            full_name: full_name.to_string(),
            password_hash: password_hash.to_string(),
            role,
            is_active: true,
        };

        match self.users.entry(key) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "email already registered: {email}"
            ))),
            Entry::Vacant(entry) => {
                entry.insert(user.clone());
                Ok(user)
            }
        }
    }

    /// Finds a user by email (case-insensitive).
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .get(&email.to_lowercase())
            .map(|u| u.value().clone())
    }

    /// Returns whether an email is already registered.
    #[must_use]
    pub fn email_exists(&self, email: &str) -> bool {
        self.users.contains_key(&email.to_lowercase())
    }
}
