use std::sync::Arc;

use crate::{
    crypto::token::{OsTokenGenerator, TokenGenerator, effective_token_len, hash_token},
    error::{AppError, Result},
    models::{session::Session, user::User},
    repositories::store::SessionStore,
};

/// Issues, resolves and revokes session tokens.
///
/// Only the hash of a token reaches the store. Each user owns at most one
/// session row; creating a new one overwrites the previous hash, so the old
/// token stops resolving.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenGenerator>,
    bytes_per_token: usize,
}

impl SessionService {
    /// Creates a new `SessionService`.
    ///
    /// # Arguments
    ///
    /// * `store` - The session persistence backend.
    /// * `bytes_per_token` - Requested token size; raised to the minimum if lower.
    pub fn new(store: Arc<dyn SessionStore>, bytes_per_token: usize) -> Self {
        Self::with_generator(store, Arc::new(OsTokenGenerator), bytes_per_token)
    }

    /// Creates a `SessionService` drawing tokens from `tokens`.
    pub fn with_generator(
        store: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenGenerator>,
        bytes_per_token: usize,
    ) -> Self {
        Self {
            store,
            tokens,
            bytes_per_token: effective_token_len(bytes_per_token),
        }
    }

    /// The token size actually in use.
    pub fn bytes_per_token(&self) -> usize {
        self.bytes_per_token
    }

    /// Creates (or replaces) the session for a user.
    ///
    /// The token is generated before anything is written, and the write is a
    /// single upsert, so a failure leaves the previous session untouched.
    ///
    /// # Returns
    ///
    /// The `Session`, whose `token` must be delivered to the client.
    pub async fn create(&self, user_id: i32) -> Result<Session> {
        let token = self.tokens.generate(self.bytes_per_token)?;
        let token_hash = hash_token(&token);

        let id = self.store.upsert(user_id, &token_hash).await?;
        tracing::debug!("🔑 Session {} issued for user {}", id, user_id);

        Ok(Session {
            id,
            user_id,
            token,
            token_hash,
        })
    }

    /// Resolves a token to the user it authenticates.
    ///
    /// # Returns
    ///
    /// The `User`, or `AppError::NotFound` when no session carries this token.
    pub async fn user(&self, token: &str) -> Result<User> {
        let token_hash = hash_token(token);
        self.store
            .find_user_by_token_hash(&token_hash)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Deletes the session for a token. Missing sessions are not an error.
    pub async fn delete(&self, token: &str) -> Result<()> {
        let token_hash = hash_token(token);
        self.store.delete_by_token_hash(&token_hash).await
    }
}
