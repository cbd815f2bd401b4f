use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Category;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: Arc<SqlitePool>,
}

impl CategoryRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, board_id: Uuid, title: &str, order_index: i32) -> Result<Category> {
        let id = Uuid::new_v4();

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, board_id, title, order_index, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(board_id)
        .bind(title)
        .bind(order_index)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(category)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(category)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Category> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list_by_board(&self, board_id: Uuid) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE board_id = $1 ORDER BY order_index ASC, created_at ASC",
        )
        .bind(board_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(categories)
    }

    pub async fn count_by_board(&self, board_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE board_id = $1")
                .bind(board_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    /// Cards referencing the category keep existing; the schema clears their `category_id`.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
