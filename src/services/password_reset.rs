use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    crypto::{
        password::hash_password,
        token::{MIN_BYTES_PER_TOKEN, generate_token, hash_token},
    },
    error::{AppError, Result},
    models::{password_reset::PasswordReset, user::User},
    repositories::store::{PasswordResetStore, UserStore},
    validation::auth::normalize_email,
};

/// Issues and consumes single-use password reset tokens.
#[derive(Clone)]
pub struct PasswordResetService {
    resets: Arc<dyn PasswordResetStore>,
    users: Arc<dyn UserStore>,
    duration: Duration,
}

impl PasswordResetService {
    /// Creates a new `PasswordResetService`.
    ///
    /// # Arguments
    ///
    /// * `resets` - Reset persistence.
    /// * `users` - User lookup by email and password updates.
    /// * `duration` - How long an issued token stays valid.
    pub fn new(
        resets: Arc<dyn PasswordResetStore>,
        users: Arc<dyn UserStore>,
        duration: Duration,
    ) -> Self {
        Self {
            resets,
            users,
            duration,
        }
    }

    /// Issues a reset token for the account with this email.
    ///
    /// Any earlier reset for the same user is replaced.
    ///
    /// # Returns
    ///
    /// The `PasswordReset` carrying the plaintext token, or
    /// `AppError::NotFound` if no account uses the email.
    pub async fn create(&self, email: &str) -> Result<PasswordReset> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::NotFound)?;

        let token = generate_token(MIN_BYTES_PER_TOKEN)?;
        let token_hash = hash_token(&token);
        let expires_at = Utc::now() + self.duration;

        let id = self.resets.upsert(user.id, &token_hash, expires_at).await?;
        tracing::info!("📧 Password reset {} issued for user {}", id, user.id);

        Ok(PasswordReset {
            id,
            user_id: user.id,
            token,
            token_hash,
            expires_at,
        })
    }

    /// Consumes a reset token by setting a new password for its user.
    ///
    /// An expired token is deleted and rejected. A valid token is deleted only
    /// after the new password hash is stored, so a failed update leaves the
    /// link usable.
    ///
    /// # Returns
    ///
    /// The `User` the token was issued to.
    pub async fn consume(&self, token: &str, new_password: &str) -> Result<User> {
        let token_hash = hash_token(token);
        let lookup = self
            .resets
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(AppError::NotFound)?;

        if Utc::now() > lookup.expires_at {
            self.resets.delete(lookup.reset_id).await?;
            tracing::warn!("❌ Expired password reset for user {}", lookup.user.id);
            return Err(AppError::Authentication("Password reset token expired".to_string()));
        }

        let password_hash = hash_password(new_password)?;
        self.users
            .update_password_hash(lookup.user.id, &password_hash)
            .await?;
        self.resets.delete(lookup.reset_id).await?;

        tracing::info!("✅ Password reset completed for user {}", lookup.user.id);
        Ok(lookup.user)
    }
}
