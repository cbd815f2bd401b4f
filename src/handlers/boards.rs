use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{
    Board, BoardWithDetails, CreateBoard, PublicBoard, UpdateBoardBackground, UpdateBoardStatus,
};
use crate::services::cards::group_by_category;
use crate::state::AppState;

pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateBoard>,
) -> Result<Json<Board>> {
    let board = state
        .boards
        .create_board(Some(auth.user_id()), &input.title, &input.slug)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(board))
}

pub async fn list_boards(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<Board>> {
    Json(state.boards.list_boards(auth.user_id()).await)
}

pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<BoardWithDetails>> {
    let board = state
        .boards
        .readable_board(board_id, Some(auth.user_id()))
        .await?;

    let categories = state.categories.list_categories(board_id).await;
    let cards = state.cards.list_cards(board_id).await;

    Ok(Json(BoardWithDetails {
        board,
        categories,
        cards,
    }))
}

pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<UpdateBoardStatus>,
) -> Result<Json<Board>> {
    state.boards.owned_board(board_id, auth.user_id()).await?;

    let board = state.boards.set_status(board_id, input.status).await?;
    Ok(Json(board))
}

pub async fn update_background(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<UpdateBoardBackground>,
) -> Result<Json<Board>> {
    state.boards.owned_board(board_id, auth.user_id()).await?;

    let board = state
        .boards
        .set_background_url(board_id, input.background_url.as_deref())
        .await?;
    Ok(Json(board))
}

pub async fn public_board(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicBoard>> {
    Ok(Json(load_public_board(&state, &slug).await?))
}

pub(crate) async fn load_public_board(state: &AppState, slug: &str) -> Result<PublicBoard> {
    let board = state.boards.published_board(slug).await?;

    let categories = state.categories.list_categories(board.id).await;
    let cards = state.cards.list_cards(board.id).await;
    let (sections, uncategorized) = group_by_category(categories, cards);

    Ok(PublicBoard {
        id: board.id,
        title: board.title,
        slug: board.slug,
        background_url: board.background_url,
        updated_at: board.updated_at,
        sections,
        uncategorized,
    })
}
