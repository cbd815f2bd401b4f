use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthUser, OptionalAuthUser};
use crate::error::{AppError, Result};
use crate::handlers::auth::{cleared_session_cookie, session_cookie};
use crate::handlers::boards::load_public_board;
use crate::handlers::cards::read_card_form;
use crate::models::{Board, BoardStatus, Card, CategorySection, Credentials};
use crate::services::cards::group_by_category;
use crate::services::{GateView, SessionGate};
use crate::state::AppState;

// Template structs
#[derive(Template)]
#[template(path = "auth.html")]
struct AuthTemplate {
    message: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user: String,
    alert: Option<String>,
    boards: Vec<BoardListItem>,
    editor: Option<EditorView>,
}

#[derive(Template)]
#[template(path = "public_board.html")]
struct PublicBoardTemplate {
    title: String,
    background_url: Option<String>,
    sections: Vec<SectionView>,
    uncategorized: Vec<CardView>,
}

// View structs for templates
struct BoardListItem {
    id: String,
    title: String,
    slug: String,
    status: String,
    visibility: String,
    selected: bool,
}

struct EditorView {
    id: String,
    title: String,
    slug: String,
    published: bool,
    background_url: String,
    categories: Vec<CategoryView>,
    sections: Vec<SectionView>,
    uncategorized: Vec<CardView>,
    next_index: usize,
    next_category_index: usize,
}

struct CategoryView {
    id: String,
    title: String,
    order_index: i32,
}

struct SectionView {
    title: String,
    cards: Vec<CardView>,
}

struct CardView {
    id: String,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    link_url: Option<String>,
    order_index: i32,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        Self {
            id: card.id.to_string(),
            title: card.title,
            description: card.description,
            image_url: card.image_url,
            link_url: card.link_url,
            order_index: card.order_index,
        }
    }
}

impl From<CategorySection> for SectionView {
    fn from(section: CategorySection) -> Self {
        Self {
            title: section.category.title,
            cards: section.cards.into_iter().map(CardView::from).collect(),
        }
    }
}

// Form structs
#[derive(Deserialize)]
pub struct AlertQuery {
    alert: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBoardForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    slug: String,
}

#[derive(Deserialize)]
pub struct StatusForm {
    status: BoardStatus,
}

#[derive(Deserialize)]
pub struct BackgroundForm {
    #[serde(default)]
    background_url: String,
}

#[derive(Deserialize)]
pub struct CreateCategoryForm {
    #[serde(default)]
    title: String,
    order_index: Option<i32>,
}

// Handlers
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<AlertQuery>,
) -> Result<Response> {
    let token = jar.get(crate::auth::SESSION_COOKIE).map(|c| c.value().to_string());
    let gate = SessionGate::mount(state.identity.clone(), token.as_deref()).await?;
    let view = gate.view().await;
    let session = gate.current().await;
    gate.unmount().await;

    match (view, session) {
        (GateView::Dashboard, Some(session)) => {
            let auth = AuthUser { session };
            Ok(render_dashboard(&state, &auth, None, query.alert).await?.into_response())
        }
        _ => Ok(Html(AuthTemplate { message: None }.render()?).into_response()),
    }
}

pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<Credentials>,
) -> Result<Response> {
    let gate = SessionGate::mount(state.identity.clone(), None).await?;
    let outcome = gate.sign_in(&input.email, &input.password).await;
    let session = gate.current().await;
    gate.unmount().await;

    match session {
        Some(session) if outcome.is_success() => {
            Ok((jar.add(session_cookie(session.token)), Redirect::to("/")).into_response())
        }
        _ => {
            let template = AuthTemplate {
                message: Some(outcome.message().to_string()),
            };
            Ok(Html(template.render()?).into_response())
        }
    }
}

pub async fn signup_submit(
    State(state): State<AppState>,
    Form(input): Form<Credentials>,
) -> Result<Response> {
    let gate = SessionGate::mount(state.identity.clone(), None).await?;
    let outcome = gate.sign_up(&input.email, &input.password).await;
    gate.unmount().await;

    let template = AuthTemplate {
        message: Some(outcome.message().to_string()),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn logout_submit(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let token = jar.get(crate::auth::SESSION_COOKIE).map(|c| c.value().to_string());
    let gate = SessionGate::mount(state.identity.clone(), token.as_deref()).await?;
    let signed_out = gate.sign_out().await;
    gate.unmount().await;
    signed_out?;

    Ok((jar.add(cleared_session_cookie()), Redirect::to("/")).into_response())
}

pub async fn create_board_submit(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Form(input): Form<CreateBoardForm>,
) -> Redirect {
    let owner_id = auth.0.as_ref().map(|a| a.user_id());
    match state
        .boards
        .create_board(owner_id, &input.title, &input.slug)
        .await
    {
        Ok(_) => Redirect::to("/"),
        Err(e) => reload_dashboard(e),
    }
}

pub async fn board_page(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Query(query): Query<AlertQuery>,
) -> Result<Html<String>> {
    let board = state.boards.owned_board(board_id, auth.user_id()).await?;
    render_dashboard(&state, &auth, Some(board), query.alert).await
}

pub async fn status_submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Form(input): Form<StatusForm>,
) -> Redirect {
    let outcome = async {
        state.boards.owned_board(board_id, auth.user_id()).await?;
        state.boards.set_status(board_id, input.status).await?;
        Ok::<(), AppError>(())
    }
    .await;

    reload_board(board_id, outcome)
}

pub async fn background_submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Form(input): Form<BackgroundForm>,
) -> Redirect {
    let outcome = async {
        state.boards.owned_board(board_id, auth.user_id()).await?;
        state
            .boards
            .set_background_url(board_id, Some(&input.background_url))
            .await?;
        Ok::<(), AppError>(())
    }
    .await;

    reload_board(board_id, outcome)
}

pub async fn create_category_submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Form(input): Form<CreateCategoryForm>,
) -> Redirect {
    let outcome = async {
        state.boards.owned_board(board_id, auth.user_id()).await?;
        state
            .categories
            .create_category(board_id, &input.title, input.order_index)
            .await?;
        Ok::<(), AppError>(())
    }
    .await;

    reload_board(board_id, outcome)
}

pub async fn delete_category_submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> Redirect {
    let board_id = match state.categories.get(category_id).await {
        Ok(category) => category.board_id,
        Err(e) => return reload_dashboard(e),
    };

    let outcome = async {
        state.boards.owned_board(board_id, auth.user_id()).await?;
        state.categories.delete_category(category_id).await
    }
    .await;

    reload_board(board_id, outcome)
}

pub async fn create_card_submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    multipart: Multipart,
) -> Redirect {
    let outcome = async {
        state.boards.owned_board(board_id, auth.user_id()).await?;
        let input = read_card_form(multipart).await?;
        state.cards.create_card(board_id, input).await?;
        Ok::<(), AppError>(())
    }
    .await;

    reload_board(board_id, outcome)
}

pub async fn delete_card_submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Redirect {
    let board_id = match state.cards.get(card_id).await {
        Ok(card) => card.board_id,
        Err(e) => return reload_dashboard(e),
    };

    let outcome = async {
        state.boards.owned_board(board_id, auth.user_id()).await?;
        state.cards.delete_card(card_id).await
    }
    .await;

    reload_board(board_id, outcome)
}

pub async fn public_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let board = load_public_board(&state, &slug).await?;

    let template = PublicBoardTemplate {
        title: board.title,
        background_url: board.background_url,
        sections: board.sections.into_iter().map(SectionView::from).collect(),
        uncategorized: board.uncategorized.into_iter().map(CardView::from).collect(),
    };

    Ok(Html(template.render()?))
}

/// Every mutation reloads the board editor, carrying the failure message if any.
fn reload_board(board_id: Uuid, outcome: Result<()>) -> Redirect {
    match outcome {
        Ok(()) => Redirect::to(&format!("/boards/{}", board_id)),
        Err(e) => {
            tracing::warn!(%board_id, error = %e, "Board mutation failed");
            Redirect::to(&format!(
                "/boards/{}?alert={}",
                board_id,
                urlencoding::encode(&e.user_message())
            ))
        }
    }
}

/// Back to the dashboard with an alert, for failures not tied to a known board.
fn reload_dashboard(e: AppError) -> Redirect {
    tracing::warn!(error = %e, "Dashboard action failed");
    Redirect::to(&format!("/?alert={}", urlencoding::encode(&e.user_message())))
}

async fn render_dashboard(
    state: &AppState,
    auth: &AuthUser,
    selected: Option<Board>,
    alert: Option<String>,
) -> Result<Html<String>> {
    let selected_id = selected.as_ref().map(|b| b.id);

    let boards = state
        .boards
        .list_boards(auth.user_id())
        .await
        .into_iter()
        .map(|b| BoardListItem {
            selected: Some(b.id) == selected_id,
            id: b.id.to_string(),
            title: b.title,
            slug: b.slug,
            status: b.status,
            visibility: b.visibility,
        })
        .collect();

    let editor = match selected {
        Some(board) => Some(load_editor(state, board).await),
        None => None,
    };

    let template = DashboardTemplate {
        user: auth.email().to_string(),
        alert: alert.filter(|a| !a.is_empty()),
        boards,
        editor,
    };

    Ok(Html(template.render()?))
}

async fn load_editor(state: &AppState, board: Board) -> EditorView {
    let categories = state.categories.list_categories(board.id).await;
    let cards = state.cards.list_cards(board.id).await;

    // Both indexes come from what this page shows, not from a server counter.
    let next_index = cards.len();
    let next_category_index = categories.len();

    let published = board.is_published();
    let category_views = categories
        .iter()
        .map(|c| CategoryView {
            id: c.id.to_string(),
            title: c.title.clone(),
            order_index: c.order_index,
        })
        .collect();
    let (sections, uncategorized) = group_by_category(categories, cards);

    EditorView {
        id: board.id.to_string(),
        title: board.title,
        slug: board.slug,
        published,
        background_url: board.background_url.unwrap_or_default(),
        categories: category_views,
        sections: sections.into_iter().map(SectionView::from).collect(),
        uncategorized: uncategorized.into_iter().map(CardView::from).collect(),
        next_index,
        next_category_index,
    }
}
