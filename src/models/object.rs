use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored blob's metadata, keyed by bucket and path.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub cache_control: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}
