use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::repo::{
    board::BoardRepository, card::CardRepository, category::CategoryRepository,
    object::ObjectRepository, session::SessionRepository, user::UserRepository,
};
use crate::services::{AssetUploader, BoardRegistry, CardRegistry, CategoryRegistry, IdentityService};
use crate::storage::LocalBlobStore;

#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub boards: BoardRegistry,
    pub categories: CategoryRegistry,
    pub cards: CardRegistry,
    pub blobs: LocalBlobStore,
    pub config: Arc<Config>,
    pub pool: Arc<SqlitePool>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let pool = Arc::new(pool);
        let blobs = LocalBlobStore::new(
            &config.storage_dir,
            &config.public_base_url,
            ObjectRepository::new(pool.clone()),
        );
        let assets = AssetUploader::new(blobs.clone(), &config.image_bucket);
        let category_repo = CategoryRepository::new(pool.clone());

        Self {
            identity: IdentityService::new(
                UserRepository::new(pool.clone()),
                SessionRepository::new(pool.clone(), config.session_ttl_days),
            ),
            boards: BoardRegistry::new(BoardRepository::new(pool.clone())),
            categories: CategoryRegistry::new(category_repo.clone()),
            cards: CardRegistry::new(CardRepository::new(pool.clone()), category_repo, assets),
            blobs,
            config: Arc::new(config),
            pool,
        }
    }
}
