use anyhow::Context;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// | Env Var            | Default                          |
/// |--------------------|----------------------------------|
/// | `DATABASE_URL`     | `sqlite:board_admin.db?mode=rwc` |
/// | `HOST`             | `127.0.0.1`                      |
/// | `PORT`             | `3000`                           |
/// | `STORAGE_DIR`      | `storage`                        |
/// | `PUBLIC_BASE_URL`  | `http://localhost:3000`          |
/// | `IMAGE_BUCKET`     | `card-images`                    |
/// | `SESSION_TTL_DAYS` | `7`                              |
/// | `MAX_UPLOAD_BYTES` | `10485760`                       |
/// | `CORS_ORIGINS`     | `*`                              |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub storage_dir: PathBuf,
    /// Prefix for public object URLs, without a trailing slash.
    pub public_base_url: String,
    pub image_bucket: String,
    pub session_ttl_days: i64,
    pub max_upload_bytes: usize,
    /// Origins allowed to read `/api/public`. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_or("DATABASE_URL", "sqlite:board_admin.db?mode=rwc");
        let host = env_or("HOST", "127.0.0.1");
        let port = parse_env("PORT", "3000")?;
        let storage_dir = PathBuf::from(env_or("STORAGE_DIR", "storage"));
        let public_base_url = env_or("PUBLIC_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();
        let image_bucket = env_or("IMAGE_BUCKET", "card-images");
        let session_ttl_days = parse_env("SESSION_TTL_DAYS", "7")?;
        let max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", "10485760")?;

        let cors_origins = env_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "*")
            .collect();

        Ok(Self {
            database_url,
            host,
            port,
            storage_dir,
            public_base_url,
            image_bucket,
            session_ttl_days,
            max_upload_bytes,
            cors_origins,
        })
    }

    /// Defaults with the blob store rooted at `storage_dir`. Used by tests.
    pub fn for_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            storage_dir: storage_dir.into(),
            public_base_url: "http://localhost:3000".to_string(),
            image_bucket: "card-images".to_string(),
            session_ttl_days: 7,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_or(key, default)
        .parse()
        .with_context(|| format!("{key} must be a valid number"))
}
