use std::env;
use anyhow::{Context, Result};

use crate::crypto::token::MIN_BYTES_PER_TOKEN;

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The address the HTTP server binds to.
    pub server_address: String,
    /// Absolute base URL used to build links sent by email.
    pub base_url: String,
    /// The number of random bytes behind each session token.
    pub session_bytes_per_token: usize,
    /// How long a password reset token stays valid, in minutes.
    pub password_reset_minutes: i64,
    /// Whether cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Directory served under `/assets`.
    pub assets_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            server_address: "127.0.0.1:3000".to_string(),
            base_url: "http://localhost:3000".to_string(),
            session_bytes_per_token: MIN_BYTES_PER_TOKEN,
            password_reset_minutes: 60,
            cookie_secure: false,
            assets_dir: "assets".to_string(),
        }
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let session_bytes_per_token = match env::var("SESSION_BYTES_PER_TOKEN") {
            Ok(raw) => raw
                .parse()
                .context("Invalid SESSION_BYTES_PER_TOKEN")?,
            Err(_) => defaults.session_bytes_per_token,
        };

        let password_reset_minutes = match env::var("PASSWORD_RESET_MINUTES") {
            Ok(raw) => raw.parse().context("Invalid PASSWORD_RESET_MINUTES")?,
            Err(_) => defaults.password_reset_minutes,
        };

        if password_reset_minutes <= 0 {
            anyhow::bail!("PASSWORD_RESET_MINUTES must be positive");
        }

        let cookie_secure = match env::var("COOKIE_SECURE") {
            Ok(raw) => raw.parse().context("COOKIE_SECURE must be true or false")?,
            Err(_) => defaults.cookie_secure,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or(defaults.server_address),
            base_url: env::var("APP_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            session_bytes_per_token,
            password_reset_minutes,
            cookie_secure,
            assets_dir: env::var("ASSETS_DIR").unwrap_or(defaults.assets_dir),
        })
    }
}
