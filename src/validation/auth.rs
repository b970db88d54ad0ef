use garde::Validate;
use serde::Deserialize;

/// Credentials submitted to sign up or sign in.
#[derive(Deserialize, Debug, Validate)]
pub struct CredentialsRequest {
    #[garde(email, length(max = 255))]
    pub email: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
}

/// The request payload for starting a password reset.
#[derive(Deserialize, Debug, Validate)]
pub struct ForgotPasswordRequest {
    #[garde(email, length(max = 255))]
    pub email: String,
}

/// The request payload for finishing a password reset.
#[derive(Deserialize, Debug, Validate)]
pub struct ResetPasswordRequest {
    #[garde(length(min = 1))]
    pub token: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
}

/// Trims and lower-cases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
