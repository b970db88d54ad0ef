use std::fmt;

/// Represents the single browser session a user may hold.
///
/// `token` is only populated by `SessionService::create`; the store keeps
/// `token_hash` alone and the raw token cannot be recovered from it.
#[derive(Clone)]
pub struct Session {
    /// The store-assigned ID of the session row.
    pub id: i32,
    /// The ID of the user this session belongs to.
    pub user_id: i32,
    /// The plaintext token, handed to the client once as a cookie.
    pub token: String,
    /// The hash of `token`, the only value persisted.
    pub token_hash: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"[redacted]")
            .field("token_hash", &self.token_hash)
            .finish()
    }
}
