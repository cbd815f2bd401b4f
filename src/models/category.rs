use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::card::Card;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    #[serde(default)]
    pub title: String,
    /// Number of categories the caller currently shows for the board.
    pub order_index: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CategorySection {
    pub category: Category,
    pub cards: Vec<Card>,
}
