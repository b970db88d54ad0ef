use std::sync::Arc;

use chrono::Duration;
use deadpool_postgres::Pool;

use crate::config::Config;
use crate::db::{self, GALLERY_MIGRATIONS};
use crate::error::Result;
use crate::repositories::{
    password_reset::PgPasswordResetStore,
    session::PgSessionStore,
    store::{PasswordResetStore, SessionStore, UserStore},
    user::PgUserStore,
};
use crate::services::{
    email::{LogMailer, Mailer},
    password_reset::PasswordResetService,
    session::SessionService,
    user::UserService,
};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// Session issuance and resolution.
    pub sessions: SessionService,
    /// Account management.
    pub users: UserService,
    /// Password reset tokens.
    pub password_resets: PasswordResetService,
    /// Outgoing email.
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL.
    ///
    /// Builds the pool and applies pending migrations before returning.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        let mut client = pool.get().await?;
        let applied = db::migrate(&mut client, &GALLERY_MIGRATIONS).await?;
        tracing::info!("✅ Migrations applied: {}", applied);

        Ok(Self::from_pool(config, pool))
    }

    fn from_pool(config: &Config, pool: Pool) -> Self {
        Self::from_stores(
            config,
            Arc::new(PgSessionStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgPasswordResetStore::new(pool)),
            Arc::new(LogMailer),
        )
    }

    /// Assembles the state from explicit storage and mail backends.
    pub fn from_stores(
        config: &Config,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        resets: Arc<dyn PasswordResetStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let sessions = SessionService::new(sessions, config.session_bytes_per_token);
        tracing::info!(
            "✅ Session service initialized ({} bytes per token)",
            sessions.bytes_per_token()
        );

        AppState {
            config: config.clone(),
            sessions,
            users: UserService::new(users.clone()),
            password_resets: PasswordResetService::new(
                resets,
                users,
                Duration::minutes(config.password_reset_minutes),
            ),
            mailer,
        }
    }
}
