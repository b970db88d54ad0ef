use async_trait::async_trait;

use crate::error::Result;

/// Outgoing account email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the password reset link to `to`.
    async fn forgot_password(&self, to: &str, reset_url: &str) -> Result<()>;
}

/// A `Mailer` that writes messages to the log instead of delivering them.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn forgot_password(&self, to: &str, reset_url: &str) -> Result<()> {
        tracing::info!(
            to = %to,
            subject = "Reset your password",
            "📧 To reset your password, please visit the following link: {}",
            reset_url
        );
        Ok(())
    }
}
