use std::sync::Arc;

use crate::{
    crypto::password::{hash_password, verify_password},
    error::{AppError, Result},
    models::user::User,
    repositories::store::UserStore,
    validation::auth::normalize_email,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Account creation and sign-in checks.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Creates a new user.
    ///
    /// # Arguments
    ///
    /// * `email` - The user's email; stored lower-cased.
    /// * `password` - The plaintext password; only its hash is stored.
    ///
    /// # Returns
    ///
    /// The created `User`, or `AppError::EmailTaken`.
    pub async fn create(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        tracing::debug!("🔐 Creating user: {}", email);

        let password_hash = hash_password(password)?;
        let user = self.store.create(&email, &password_hash).await?;

        tracing::info!("✅ User created with ID: {}", user.id);
        Ok(user)
    }

    /// Checks an email and password pair.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        tracing::debug!("🔐 Authenticating user: {}", email);

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!("✅ User authenticated: {}", user.id);
        Ok(user)
    }
}
