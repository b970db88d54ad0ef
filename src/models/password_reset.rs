use std::fmt;

use chrono::{DateTime, Utc};

/// A pending password reset for one user.
#[derive(Clone)]
pub struct PasswordReset {
    /// The store-assigned ID of the reset row.
    pub id: i32,
    /// The ID of the user resetting their password.
    pub user_id: i32,
    /// The plaintext token; only set when the reset is created.
    pub token: String,
    /// The hash of `token`.
    pub token_hash: String,
    /// The moment after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordReset")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"[redacted]")
            .field("token_hash", &self.token_hash)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
