use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::models::{Category, CreateCategory};
use crate::state::AppState;

pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<CreateCategory>,
) -> Result<Json<Category>> {
    state.boards.owned_board(board_id, auth.user_id()).await?;

    state
        .categories
        .create_category(board_id, &input.title, input.order_index)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Validation("Category title is required".to_string()))
}

pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Vec<Category>>> {
    state
        .boards
        .readable_board(board_id, Some(auth.user_id()))
        .await?;

    Ok(Json(state.categories.list_categories(board_id).await))
}

pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> Result<()> {
    let category = state.categories.get(category_id).await?;
    state
        .boards
        .owned_board(category.board_id, auth.user_id())
        .await?;

    state.categories.delete_category(category_id).await
}
