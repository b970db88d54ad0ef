//! Storage seams used by the services.
//!
//! The PostgreSQL implementations live next to this module; tests plug in
//! in-memory versions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::user::User;

/// Persistence for the one-session-per-user table.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts a session for `user_id`, or overwrites the hash of the
    /// existing one, in a single atomic statement. Returns the row ID.
    async fn upsert(&self, user_id: i32, token_hash: &str) -> Result<i32>;

    /// Finds the user owning the session with this token hash.
    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>>;

    /// Deletes the session with this token hash, if any.
    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<()>;
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with `AppError::EmailTaken` on a duplicate email.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User>;

    /// Finds a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Replaces a user's password hash.
    async fn update_password_hash(&self, user_id: i32, password_hash: &str) -> Result<()>;
}

/// A password reset row joined with its user.
#[derive(Debug, Clone)]
pub struct ResetLookup {
    pub reset_id: i32,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Persistence for pending password resets, one per user.
#[async_trait]
pub trait PasswordResetStore: Send + Sync {
    /// Inserts or replaces the reset for `user_id`. Returns the row ID.
    async fn upsert(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i32>;

    /// Finds a reset and its user by token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<ResetLookup>>;

    /// Deletes a reset by ID.
    async fn delete(&self, reset_id: i32) -> Result<()>;
}
