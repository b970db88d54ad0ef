use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;

use crate::{
    error::{AppError, Result},
    repositories::{
        store::{PasswordResetStore, ResetLookup},
        user::row_to_user,
    },
};

/// PostgreSQL-backed `PasswordResetStore`.
#[derive(Clone)]
pub struct PgPasswordResetStore {
    pool: Pool,
}

impl PgPasswordResetStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetStore for PgPasswordResetStore {
    async fn upsert(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i32> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO password_resets (user_id, token_hash, expires_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id) DO UPDATE
                SET token_hash = EXCLUDED.token_hash, expires_at = EXCLUDED.expires_at
                RETURNING id
                "#,
                &[&user_id, &token_hash, &expires_at],
            )
            .await?;
        row.try_get("id")
            .map_err(|_| AppError::MissingData("id".to_string()))
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<ResetLookup>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT password_resets.id AS reset_id,
                       password_resets.expires_at,
                       users.id, users.email, users.password_hash
                FROM password_resets
                JOIN users ON users.id = password_resets.user_id
                WHERE password_resets.token_hash = $1
                "#,
                &[&token_hash],
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ResetLookup {
            reset_id: row
                .try_get("reset_id")
                .map_err(|_| AppError::MissingData("reset_id".to_string()))?,
            expires_at: row
                .try_get("expires_at")
                .map_err(|_| AppError::MissingData("expires_at".to_string()))?,
            user: row_to_user(&row)?,
        }))
    }

    async fn delete(&self, reset_id: i32) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute("DELETE FROM password_resets WHERE id = $1", &[&reset_id])
            .await?;
        Ok(())
    }
}
