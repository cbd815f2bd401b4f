use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{Card, CreateCard, ImageFile};
use crate::services::NewCard;
use crate::state::AppState;

pub async fn create_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<CreateCard>,
) -> Result<Json<Card>> {
    state.boards.owned_board(board_id, auth.user_id()).await?;

    let card = state
        .cards
        .create_card(
            board_id,
            NewCard {
                category_id: input.category_id,
                title: input.title,
                description: input.description,
                link_url: input.link_url,
                image: None,
                order_index: input.order_index,
            },
        )
        .await?;

    Ok(Json(card))
}

pub async fn upload_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Card>> {
    state.boards.owned_board(board_id, auth.user_id()).await?;

    let input = read_card_form(multipart).await?;
    let card = state.cards.create_card(board_id, input).await?;
    Ok(Json(card))
}

pub async fn list_cards(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Vec<Card>>> {
    state
        .boards
        .readable_board(board_id, Some(auth.user_id()))
        .await?;

    Ok(Json(state.cards.list_cards(board_id).await))
}

pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<()> {
    let card = state.cards.get(card_id).await?;
    state.boards.owned_board(card.board_id, auth.user_id()).await?;

    state.cards.delete_card(card_id).await
}

/// Reads a card form: text fields `title`, `description`, `link_url`,
/// `category_id`, `order_index` and an optional `image` file part.
/// An empty file part counts as no image.
pub(crate) async fn read_card_form(mut multipart: Multipart) -> Result<NewCard> {
    let mut input = NewCard {
        category_id: None,
        title: String::new(),
        description: None,
        link_url: None,
        image: None,
        order_index: 0,
    };
    let mut order_index = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if !file_name.is_empty() && !bytes.is_empty() {
                input.image = Some(ImageFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "title" => input.title = value,
            "description" => input.description = Some(value),
            "link_url" => input.link_url = Some(value),
            "category_id" => input.category_id = parse_category_id(&value)?,
            "order_index" => {
                let index = value
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| AppError::Validation("order_index must be a number".to_string()))?;
                order_index = Some(index);
            }
            _ => {}
        }
    }

    input.order_index =
        order_index.ok_or_else(|| AppError::Validation("order_index is required".to_string()))?;
    Ok(input)
}

fn parse_category_id(value: &str) -> Result<Option<Uuid>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest("Invalid category id".to_string()))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", e))
}
