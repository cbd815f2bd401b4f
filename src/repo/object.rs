use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::error::Result;
use crate::models::StoredObject;

#[derive(Clone)]
pub struct ObjectRepository {
    pool: Arc<SqlitePool>,
}

impl ObjectRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Records an object. With `upsert`, an existing record for the same
    /// bucket and path is replaced; otherwise the insert conflicts.
    pub async fn put(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        cache_control: &str,
        size: i64,
        upsert: bool,
    ) -> Result<StoredObject> {
        let sql = if upsert {
            r#"
            INSERT INTO objects (bucket, path, content_type, cache_control, size, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (bucket, path) DO UPDATE SET
                content_type = excluded.content_type,
                cache_control = excluded.cache_control,
                size = excluded.size,
                created_at = excluded.created_at
            RETURNING *
            "#
        } else {
            r#"
            INSERT INTO objects (bucket, path, content_type, cache_control, size, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#
        };

        let object = sqlx::query_as::<_, StoredObject>(sql)
            .bind(bucket)
            .bind(path)
            .bind(content_type)
            .bind(cache_control)
            .bind(size)
            .bind(Utc::now())
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(object)
    }

    pub async fn find(&self, bucket: &str, path: &str) -> Result<Option<StoredObject>> {
        let object = sqlx::query_as::<_, StoredObject>(
            "SELECT * FROM objects WHERE bucket = $1 AND path = $2",
        )
        .bind(bucket)
        .bind(path)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(object)
    }

    pub async fn delete(&self, bucket: &str, path: &str) -> Result<()> {
        sqlx::query("DELETE FROM objects WHERE bucket = $1 AND path = $2")
            .bind(bucket)
            .bind(path)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
