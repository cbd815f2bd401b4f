use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Session;

#[derive(Clone)]
pub struct SessionRepository {
    pool: Arc<SqlitePool>,
    ttl: Duration,
}

impl SessionRepository {
    pub fn new(pool: Arc<SqlitePool>, ttl_days: i64) -> Self {
        Self {
            pool,
            ttl: Duration::days(ttl_days),
        }
    }

    pub async fn create(&self, user_id: Uuid, token_hash: &str) -> Result<Session> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    pub async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    /// Removes the session and returns it, if it existed.
    pub async fn delete_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "DELETE FROM sessions WHERE token_hash = $1 RETURNING *",
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
