pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod services;
pub mod state;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/session", get(handlers::auth::current_session))
        .route("/auth/user", get(handlers::auth::current_user))
        // Board routes
        .route("/boards", post(handlers::boards::create_board))
        .route("/boards", get(handlers::boards::list_boards))
        .route("/boards/{board_id}", get(handlers::boards::get_board))
        .route(
            "/boards/{board_id}/status",
            patch(handlers::boards::update_status),
        )
        .route(
            "/boards/{board_id}/background",
            patch(handlers::boards::update_background),
        )
        // Category routes
        .route(
            "/boards/{board_id}/categories",
            post(handlers::categories::create_category),
        )
        .route(
            "/boards/{board_id}/categories",
            get(handlers::categories::list_categories),
        )
        .route(
            "/categories/{category_id}",
            delete(handlers::categories::delete_category),
        )
        // Card routes
        .route(
            "/boards/{board_id}/cards",
            post(handlers::cards::create_card),
        )
        .route("/boards/{board_id}/cards", get(handlers::cards::list_cards))
        .route(
            "/boards/{board_id}/cards/upload",
            post(handlers::cards::upload_card),
        )
        .route("/cards/{card_id}", delete(handlers::cards::delete_card));

    let public_routes = Router::new()
        .route("/boards/{slug}", get(handlers::boards::public_board))
        .layer(public_cors(&state.config.cors_origins));

    let web_routes = Router::new()
        .route("/", get(handlers::web::index))
        .route("/login", post(handlers::web::login_submit))
        .route("/signup", post(handlers::web::signup_submit))
        .route("/logout", post(handlers::web::logout_submit))
        .route("/boards/new", post(handlers::web::create_board_submit))
        .route("/boards/{board_id}", get(handlers::web::board_page))
        .route(
            "/boards/{board_id}/status",
            post(handlers::web::status_submit),
        )
        .route(
            "/boards/{board_id}/background",
            post(handlers::web::background_submit),
        )
        .route(
            "/boards/{board_id}/categories/new",
            post(handlers::web::create_category_submit),
        )
        .route(
            "/categories/{category_id}/delete",
            post(handlers::web::delete_category_submit),
        )
        .route(
            "/boards/{board_id}/cards/new",
            post(handlers::web::create_card_submit),
        )
        .route(
            "/cards/{card_id}/delete",
            post(handlers::web::delete_card_submit),
        )
        .route("/b/{slug}", get(handlers::web::public_page));

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .nest("/api/public", public_routes)
        .nest("/api", api_routes)
        .merge(web_routes)
        .route(
            &format!("{}/{{bucket}}/{{*path}}", storage::PUBLIC_PREFIX),
            get(handlers::storage::serve_object),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Read-only CORS for the public board endpoint.
fn public_cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(allow_origin)
}

pub mod test_utils {
    use crate::config::Config;
    use crate::models::User;
    use crate::state::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use uuid::Uuid;

    pub const TEST_PASSWORD: &str = "testpassword123";

    pub async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub async fn create_test_state() -> AppState {
        let storage_dir = std::env::temp_dir().join(format!("board-admin-test-{}", Uuid::new_v4()));
        create_test_state_with_config(Config::for_storage_dir(storage_dir)).await
    }

    pub async fn create_test_state_with_config(config: Config) -> AppState {
        let pool = create_test_pool().await;
        AppState::new(pool, config)
    }

    pub async fn create_test_user(state: &AppState, email: &str) -> User {
        state
            .identity
            .sign_up(email, TEST_PASSWORD)
            .await
            .expect("Failed to create test user")
    }

    /// Signs the user in and returns the raw session token.
    pub async fn create_test_session(state: &AppState, email: &str) -> String {
        state
            .identity
            .sign_in_with_password(email, TEST_PASSWORD)
            .await
            .expect("Failed to sign in test user")
            .token
    }
}
