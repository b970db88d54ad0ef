use serde::Serialize;

/// Represents a user in the system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i32,
    /// The user's email address, lower-cased.
    pub email: String,
    /// The user's hashed password.
    #[serde(skip_serializing)]
    pub password_hash: String,
}
