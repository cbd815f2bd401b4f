use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Board, BoardStatus, BoardVisibility};

#[derive(Clone)]
pub struct BoardRepository {
    pool: Arc<SqlitePool>,
}

impl BoardRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        slug: &str,
        status: BoardStatus,
        visibility: BoardVisibility,
    ) -> Result<Board> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (id, owner_id, title, slug, status, visibility, background_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, $7, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .bind(slug)
        .bind(status.to_string())
        .bind(visibility.to_string())
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(board)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>> {
        let board = sqlx::query_as::<_, Board>("SELECT * FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(board)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Board> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Most recently updated published public board carrying `slug`.
    pub async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Board>> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT * FROM boards
            WHERE slug = $1 AND status = 'published' AND visibility = 'public'
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(board)
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Board>> {
        let boards = sqlx::query_as::<_, Board>(
            "SELECT * FROM boards WHERE owner_id = $1 ORDER BY updated_at DESC",
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(boards)
    }

    pub async fn update_status(&self, id: Uuid, status: BoardStatus) -> Result<Board> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .bind(Utc::now())
        .fetch_optional(self.pool.as_ref())
        .await?;

        board.ok_or(AppError::NotFound)
    }

    pub async fn update_background_url(
        &self,
        id: Uuid,
        background_url: Option<&str>,
    ) -> Result<Board> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET background_url = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(background_url)
        .bind(Utc::now())
        .fetch_optional(self.pool.as_ref())
        .await?;

        board.ok_or(AppError::NotFound)
    }
}
