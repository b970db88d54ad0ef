use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::{store::SessionStore, user::row_to_user},
};

/// PostgreSQL-backed `SessionStore`.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: Pool,
}

impl PgSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn upsert(&self, user_id: i32, token_hash: &str) -> Result<i32> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO sessions (user_id, token_hash)
                VALUES ($1, $2)
                ON CONFLICT (user_id) DO UPDATE
                SET token_hash = EXCLUDED.token_hash
                RETURNING id
                "#,
                &[&user_id, &token_hash],
            )
            .await?;
        row.try_get("id")
            .map_err(|_| AppError::MissingData("id".to_string()))
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT users.id, users.email, users.password_hash
                FROM sessions
                JOIN users ON users.id = sessions.user_id
                WHERE sessions.token_hash = $1
                "#,
                &[&token_hash],
            )
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "DELETE FROM sessions WHERE token_hash = $1",
                &[&token_hash],
            )
            .await?;
        Ok(())
    }
}
