use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Board, BoardStatus, BoardVisibility};
use crate::repo::board::BoardRepository;

const DEFAULT_TITLE: &str = "Untitled";

#[derive(Clone)]
pub struct BoardRegistry {
    boards: BoardRepository,
}

impl BoardRegistry {
    pub fn new(boards: BoardRepository) -> Self {
        Self { boards }
    }

    /// Creates a draft public board. Without a known owner nothing is created.
    pub async fn create_board(
        &self,
        owner_id: Option<Uuid>,
        title: &str,
        raw_slug: &str,
    ) -> Result<Option<Board>> {
        let Some(owner_id) = owner_id else {
            tracing::warn!("Ignoring board creation without a signed-in user");
            return Ok(None);
        };

        let slug = derive_slug(title, raw_slug, Utc::now());
        let title = if title.trim().is_empty() { DEFAULT_TITLE } else { title };

        let board = self
            .boards
            .create(
                owner_id,
                title,
                &slug,
                BoardStatus::Draft,
                BoardVisibility::Public,
            )
            .await?;

        tracing::info!(board_id = %board.id, slug = %board.slug, "Created board");
        Ok(Some(board))
    }

    /// Boards owned by `owner_id`, most recently updated first. Read failures yield an empty list.
    pub async fn list_boards(&self, owner_id: Uuid) -> Vec<Board> {
        match self.boards.list_for_owner(owner_id).await {
            Ok(boards) => boards,
            Err(e) => {
                tracing::error!(%owner_id, error = %e, "Failed to list boards");
                Vec::new()
            }
        }
    }

    pub async fn set_status(&self, board_id: Uuid, status: BoardStatus) -> Result<Board> {
        let board = self.boards.update_status(board_id, status).await?;
        tracing::info!(%board_id, %status, "Updated board status");
        Ok(board)
    }

    /// Blank clears the background; anything else must be an http(s) URL.
    pub async fn set_background_url(&self, board_id: Uuid, url: Option<&str>) -> Result<Board> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(background_url)
            .transpose()?;
        self.boards
            .update_background_url(board_id, url.as_deref())
            .await
    }

    /// The board, if `user_id` owns it.
    pub async fn owned_board(&self, board_id: Uuid, user_id: Uuid) -> Result<Board> {
        let board = self.boards.get_by_id(board_id).await?;
        if board.owner_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(board)
    }

    /// The board, if the owner is asking or it is published and public.
    pub async fn readable_board(&self, board_id: Uuid, viewer: Option<Uuid>) -> Result<Board> {
        let board = self.boards.get_by_id(board_id).await?;
        if Some(board.owner_id) == viewer || board.is_publicly_readable() {
            return Ok(board);
        }
        Err(AppError::Forbidden)
    }

    pub async fn published_board(&self, slug: &str) -> Result<Board> {
        self.boards
            .find_published_by_slug(slug)
            .await?
            .ok_or(AppError::NotFound)
    }
}

/// Slug for a new board: the raw slug if given, else the title, made URL-safe.
/// Falls back to `board-<epoch-millis>` when nothing URL-safe remains.
pub fn derive_slug(title: &str, raw_slug: &str, now: DateTime<Utc>) -> String {
    let source = if raw_slug.is_empty() { title } else { raw_slug };
    let slug = slugify(source);
    if slug.is_empty() {
        format!("board-{}", now.timestamp_millis())
    } else {
        slug
    }
}

/// Parses `raw` as an absolute http(s) URL. The serialized form must not carry
/// characters that could end a CSS `url(...)` token.
pub fn background_url(raw: &str) -> Result<String> {
    let invalid = || AppError::Validation("Background URL must be an http(s) URL".to_string());

    let parsed = url::Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }

    let serialized = String::from(parsed);
    if serialized.contains(['\'', '"', '(', ')']) {
        return Err(invalid());
    }
    Ok(serialized)
}

/// Lowercases and collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen, without leading or trailing hyphens.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for ch in lowered.trim().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn is_url_safe(slug: &str) -> bool {
        slug.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("My Board!!"), "my-board");
        assert_eq!(slugify("  Hello   World  "), "hello-world");
        assert_eq!(slugify("--already-slugged--"), "already-slugged");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("2024 Recap"), "2024-recap");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for input in ["My Board!!", "a__b", " -x- ", "ÜBER cool", "", "!!!", "a1-b2"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {:?}", input);
            assert!(is_url_safe(&once), "input {:?} gave {:?}", input, once);
        }
    }

    #[test]
    fn test_non_alphanumeric_title_falls_back_to_timestamp() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(derive_slug("!!! ???", "", now), "board-1700000000123");
    }

    #[test]
    fn test_background_url_accepts_http_urls() {
        assert_eq!(
            background_url("https://img.example.com/bg.png").unwrap(),
            "https://img.example.com/bg.png"
        );
        assert_eq!(
            background_url("HTTP://Example.com").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_background_url_rejects_other_schemes_and_breakouts() {
        for raw in [
            "javascript:alert(1)",
            "data:image/png;base64,AAAA",
            "img.example.com/bg.png",
            "https://x.example/a');background:red;('",
        ] {
            assert!(
                matches!(background_url(raw), Err(AppError::Validation(_))),
                "accepted {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_raw_slug_takes_precedence_over_title() {
        let now = Utc::now();
        assert_eq!(derive_slug("My Board", "Custom Slug", now), "custom-slug");
        assert_eq!(derive_slug("My Board", "", now), "my-board");
    }
}
