use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::error::{AppError, Result};
use std::time::Duration;

/// Creates a new database connection pool.
///
/// # Arguments
///
/// * `database_url` - The URL of the PostgreSQL database.
///
/// # Returns
///
/// A `Result` containing the `Pool`.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let mut cfg = Config::new();
    let pg_config: tokio_postgres::Config = database_url.parse()?;

    if let Some(tokio_postgres::config::Host::Tcp(hostname)) = pg_config.get_hosts().first() {
        cfg.host = Some(hostname.to_string());
    }

    if let Some(port) = pg_config.get_ports().first() {
        cfg.port = Some(*port);
    }

    if let Some(dbname) = pg_config.get_dbname() {
        cfg.dbname = Some(dbname.to_string());
    }

    if let Some(user) = pg_config.get_user() {
        cfg.user = Some(user.to_string());
    }

    if let Some(password) = pg_config.get_password() {
        cfg.password = Some(String::from_utf8_lossy(password).to_string());
    }

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.pool = Some(PoolConfig {
        max_size: 32,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(2)),
            recycle: Some(Duration::from_secs(1)),
        },
        ..Default::default()
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(AppError::from)
}

/// One schema change, applied at most once.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// The migrations to apply and where to record them.
///
/// Passed explicitly to [`migrate`]; nothing about it outlives the call.
#[derive(Debug, Clone, Copy)]
pub struct MigrationSet<'a> {
    /// Bookkeeping table holding applied versions.
    pub table: &'a str,
    /// Migrations in ascending version order.
    pub migrations: &'a [Migration],
}

/// The schema this application runs on.
pub const GALLERY_MIGRATIONS: MigrationSet<'static> = MigrationSet {
    table: "schema_migrations",
    migrations: &[
        Migration {
            version: 1,
            name: "users",
            sql: include_str!("../migrations/0001_users.sql"),
        },
        Migration {
            version: 2,
            name: "sessions",
            sql: include_str!("../migrations/0002_sessions.sql"),
        },
        Migration {
            version: 3,
            name: "password_resets",
            sql: include_str!("../migrations/0003_password_resets.sql"),
        },
    ],
};

impl MigrationSet<'_> {
    /// Checks the table name and version ordering.
    pub fn validate(&self) -> Result<()> {
        let valid_table = !self.table.is_empty()
            && self
                .table
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid_table {
            return Err(AppError::Internal(format!(
                "Invalid migrations table name: {:?}",
                self.table
            )));
        }

        for pair in self.migrations.windows(2) {
            if pair[0].version >= pair[1].version {
                return Err(AppError::Internal(format!(
                    "Migration {} ({}) is out of order",
                    pair[1].version, pair[1].name
                )));
            }
        }
        Ok(())
    }
}

/// Applies every migration in `set` that has not run yet.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row, under an exclusive lock on the bookkeeping table.
///
/// # Returns
///
/// The number of migrations applied by this call.
pub async fn migrate(client: &mut tokio_postgres::Client, set: &MigrationSet<'_>) -> Result<usize> {
    set.validate()?;

    client
        .batch_execute(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            set.table
        ))
        .await?;

    let mut applied = 0;
    for migration in set.migrations {
        let tx = client.transaction().await?;
        tx.batch_execute(&format!("LOCK TABLE {} IN EXCLUSIVE MODE", set.table))
            .await?;

        let done = tx
            .query_opt(
                &format!("SELECT version FROM {} WHERE version = $1", set.table),
                &[&migration.version],
            )
            .await?
            .is_some();
        if done {
            tx.rollback().await?;
            continue;
        }

        tracing::info!("📦 Applying migration {} ({})", migration.version, migration.name);
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            &format!("INSERT INTO {} (version, name) VALUES ($1, $2)", set.table),
            &[&migration.version, &migration.name],
        )
        .await?;
        tx.commit().await?;
        applied += 1;
    }

    Ok(applied)
}
