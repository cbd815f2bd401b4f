use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Card, Category, CategorySection, ImageFile};
use crate::repo::{card::CardRepository, category::CategoryRepository};
use crate::services::assets::AssetUploader;

const DEFAULT_TITLE: &str = "Untitled card";

/// Everything needed to create one card.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub link_url: Option<String>,
    pub image: Option<ImageFile>,
    /// Count of cards the caller currently shows.
    pub order_index: i32,
}

#[derive(Clone)]
pub struct CardRegistry {
    cards: CardRepository,
    categories: CategoryRepository,
    assets: AssetUploader,
}

impl CardRegistry {
    pub fn new(cards: CardRepository, categories: CategoryRepository, assets: AssetUploader) -> Self {
        Self {
            cards,
            categories,
            assets,
        }
    }

    /// Uploads the image first, if any; a failed upload creates no card.
    pub async fn create_card(&self, board_id: Uuid, input: NewCard) -> Result<Card> {
        if let Some(category_id) = input.category_id {
            let category = self
                .categories
                .find_by_id(category_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Unknown category".to_string()))?;
            if category.board_id != board_id {
                return Err(AppError::BadRequest(
                    "Category belongs to a different board".to_string(),
                ));
            }
        }

        let asset = match &input.image {
            Some(image) => Some(self.assets.upload(board_id, image).await?),
            None => None,
        };

        let title = input.title.trim();
        let title = if title.is_empty() { DEFAULT_TITLE } else { title };
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let link_url = input.link_url.as_deref().and_then(normalize_link);

        let created = self
            .cards
            .create(
                board_id,
                input.category_id,
                title,
                description,
                asset.as_ref().map(|a| a.public_url.as_str()),
                link_url.as_deref(),
                input.order_index,
            )
            .await;

        match created {
            Ok(card) => {
                tracing::info!(%board_id, card_id = %card.id, order_index = card.order_index, "Created card");
                Ok(card)
            }
            Err(e) => {
                if let Some(asset) = &asset {
                    self.assets.discard(asset).await;
                }
                Err(e)
            }
        }
    }

    /// Remaining cards keep their `order_index`.
    pub async fn delete_card(&self, card_id: Uuid) -> Result<()> {
        self.cards.delete(card_id).await?;
        tracing::info!(%card_id, "Deleted card");
        Ok(())
    }

    /// Cards of a board by `order_index`. Read failures yield an empty list.
    pub async fn list_cards(&self, board_id: Uuid) -> Vec<Card> {
        match self.cards.list_by_board(board_id).await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::error!(%board_id, error = %e, "Failed to list cards");
                Vec::new()
            }
        }
    }

    pub async fn get(&self, card_id: Uuid) -> Result<Card> {
        self.cards.get_by_id(card_id).await
    }
}

/// Trims `raw` and prefixes `https://` unless it already starts with
/// `http://` or `https://` (any case). Blank links become `None`.
pub fn normalize_link(raw: &str) -> Option<String> {
    let link = raw.trim();
    if link.is_empty() {
        return None;
    }

    if has_prefix_ignore_case(link, "http://") || has_prefix_ignore_case(link, "https://") {
        Some(link.to_string())
    } else {
        Some(format!("https://{}", link))
    }
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Splits cards into one section per category, in category order, plus the
/// cards without a (known) category. Card order is preserved.
pub fn group_by_category(
    categories: Vec<Category>,
    cards: Vec<Card>,
) -> (Vec<CategorySection>, Vec<Card>) {
    let slots: HashMap<Uuid, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut sections: Vec<CategorySection> = categories
        .into_iter()
        .map(|category| CategorySection {
            category,
            cards: Vec::new(),
        })
        .collect();
    let mut uncategorized = Vec::new();

    for card in cards {
        match card.category_id.and_then(|id| slots.get(&id)) {
            Some(&slot) => sections[slot].cards.push(card),
            None => uncategorized.push(card),
        }
    }

    (sections, uncategorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(title: &str, category_id: Option<Uuid>, order_index: i32) -> Card {
        Card {
            id: Uuid::new_v4(),
            board_id: Uuid::nil(),
            category_id,
            title: title.to_string(),
            description: None,
            image_url: None,
            link_url: None,
            order_index,
            created_at: Utc::now(),
        }
    }

    fn category(title: &str, order_index: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            board_id: Uuid::nil(),
            title: title.to_string(),
            order_index,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_link_adds_scheme() {
        assert_eq!(normalize_link("example.com").as_deref(), Some("https://example.com"));
        assert_eq!(normalize_link("  foo.com/a?b=1 ").as_deref(), Some("https://foo.com/a?b=1"));
    }

    #[test]
    fn test_normalize_link_keeps_existing_scheme() {
        assert_eq!(normalize_link("https://example.com").as_deref(), Some("https://example.com"));
        assert_eq!(normalize_link("http://example.com").as_deref(), Some("http://example.com"));
        assert_eq!(normalize_link("HTTPS://Example.com").as_deref(), Some("HTTPS://Example.com"));
    }

    #[test]
    fn test_normalize_link_is_idempotent() {
        for raw in ["example.com", "https://x.y", " HtTp://a ", "ftp://files", "é.com"] {
            let once = normalize_link(raw).unwrap();
            assert_eq!(normalize_link(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_blank_link_is_absent() {
        assert_eq!(normalize_link(""), None);
        assert_eq!(normalize_link("   "), None);
    }

    #[test]
    fn test_group_by_category() {
        let links = category("Links", 0);
        let videos = category("Videos", 1);
        let cards = vec![
            card("a", Some(videos.id), 0),
            card("b", None, 1),
            card("c", Some(links.id), 2),
            card("d", Some(Uuid::new_v4()), 3),
            card("e", Some(videos.id), 4),
        ];

        let (sections, uncategorized) = group_by_category(vec![links, videos], cards);

        let titles = |cards: &[Card]| cards.iter().map(|c| c.title.clone()).collect::<Vec<_>>();
        assert_eq!(sections[0].category.title, "Links");
        assert_eq!(titles(&sections[0].cards), ["c"]);
        assert_eq!(titles(&sections[1].cards), ["a", "e"]);
        assert_eq!(titles(&uncategorized), ["b", "d"]);
    }
}
