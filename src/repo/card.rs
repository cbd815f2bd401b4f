use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Card;

#[derive(Clone)]
pub struct CardRepository {
    pool: Arc<SqlitePool>,
}

impl CardRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        board_id: Uuid,
        category_id: Option<Uuid>,
        title: &str,
        description: Option<&str>,
        image_url: Option<&str>,
        link_url: Option<&str>,
        order_index: i32,
    ) -> Result<Card> {
        let id = Uuid::new_v4();

        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (id, board_id, category_id, title, description, image_url, link_url, order_index, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(board_id)
        .bind(category_id)
        .bind(title)
        .bind(description)
        .bind(image_url)
        .bind(link_url)
        .bind(order_index)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(card)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>> {
        let card = sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(card)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Card> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Card>> {
        let cards = sqlx::query_as::<_, Card>(
            "SELECT * FROM cards WHERE board_id = $1 ORDER BY order_index ASC, created_at ASC",
        )
        .bind(board_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(cards)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
