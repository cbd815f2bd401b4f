use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_admin::config::Config;
use board_admin::create_router;
use board_admin::models::AuthEventKind;
use board_admin::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .with_context(|| format!("failed to create {}", config.storage_dir.display()))?;

    let addr = config.bind_addr();
    let state = AppState::new(pool, config);

    let purged = state.identity.purge_expired_sessions().await?;
    if purged > 0 {
        tracing::info!(purged, "Removed expired sessions");
    }

    let mut auth_events = state.identity.on_auth_state_change();
    tokio::spawn(async move {
        while let Some(event) = auth_events.next().await {
            match event.kind {
                AuthEventKind::SignedIn => {
                    tracing::info!(user_id = %event.user_id, session_id = %event.session_id, "Signed in")
                }
                AuthEventKind::SignedOut => {
                    tracing::info!(user_id = %event.user_id, session_id = %event.session_id, "Signed out")
                }
            }
        }
    });

    let app = create_router(state);

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
