use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::card::Card;
use super::category::{Category, CategorySection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatus {
    Draft,
    Published,
}

impl std::fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardStatus::Draft => write!(f, "draft"),
            BoardStatus::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for BoardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(BoardStatus::Draft),
            "published" => Ok(BoardStatus::Published),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardVisibility {
    Public,
    Private,
}

impl std::fmt::Display for BoardVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardVisibility::Public => write!(f, "public"),
            BoardVisibility::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for BoardVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(BoardVisibility::Public),
            "private" => Ok(BoardVisibility::Private),
            _ => Err(format!("Invalid visibility: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: String,
    pub visibility: String,
    pub background_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn is_published(&self) -> bool {
        self.status.parse::<BoardStatus>() == Ok(BoardStatus::Published)
    }

    /// Published and public boards are readable by anyone.
    pub fn is_publicly_readable(&self) -> bool {
        self.is_published()
            && self.visibility.parse::<BoardVisibility>() == Ok(BoardVisibility::Public)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBoard {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoardStatus {
    pub status: BoardStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoardBackground {
    pub background_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoardWithDetails {
    #[serde(flatten)]
    pub board: Board,
    pub categories: Vec<Category>,
    pub cards: Vec<Card>,
}

/// Read model handed to the public board viewer.
#[derive(Debug, Serialize)]
pub struct PublicBoard {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub background_url: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub sections: Vec<CategorySection>,
    pub uncategorized: Vec<Card>,
}
