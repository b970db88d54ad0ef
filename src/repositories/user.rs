use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::{Row, error::SqlState};

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::store::UserStore,
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
pub(crate) fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|_| AppError::MissingData("password_hash".to_string()))?,
    })
}

/// PostgreSQL-backed `UserStore`.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO users (email, password_hash)
                VALUES ($1, $2)
                RETURNING id, email, password_hash
                "#,
                &[&email, &password_hash],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::EmailTaken
                } else {
                    AppError::Database(e)
                }
            })?;
        row_to_user(&row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, email, password_hash
                FROM users
                WHERE email = $1
                "#,
                &[&email],
            )
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn update_password_hash(&self, user_id: i32, password_hash: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE users SET password_hash = $2 WHERE id = $1",
                &[&user_id, &password_hash],
            )
            .await?;
        if updated == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
