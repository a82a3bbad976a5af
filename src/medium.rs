//! Persistence medium abstraction for the mapping store.
//!
//! The store only needs three operations over opaque string keys:
//! `write`, `read`, and `exists`. A filesystem directory, a SQLite
//! database, or an in-process map are all valid backends; the
//! [`MappingStore`](crate::store::MappingStore) never knows which one it
//! is talking to.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::db;

/// A byte-addressable read/write store keyed by opaque string keys.
///
/// Implementations must make a completed `write` immediately visible to a
/// subsequent `read`; there is no caching layer above this trait.
#[async_trait]
pub trait StorageMedium: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing value.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Read the value stored under `key`, or `None` when absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Whether a value exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Resolve the configured backend into a medium instance.
pub async fn from_config(config: &Config) -> Result<Arc<dyn StorageMedium>> {
    match config.store.backend.as_str() {
        "filesystem" => Ok(Arc::new(FilesystemMedium::new(config.store.path.clone()))),
        "sqlite" => {
            let pool = db::connect(config).await?;
            Ok(Arc::new(SqliteMedium::new(pool)))
        }
        other => anyhow::bail!("Unknown store backend: '{}'", other),
    }
}

/// One `<key>.json` file per record under a root directory.
///
/// Mirrors the historical on-disk layout where every record lives in a
/// hash-named file owned by the site.
pub struct FilesystemMedium {
    root: PathBuf,
}

impl FilesystemMedium {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

#[async_trait]
impl StorageMedium for FilesystemMedium {
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.key_path(key), bytes).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.key_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.key_path(key)).await?)
    }
}

/// SQLite key/value backend over the `records` table.
///
/// The table is created by [`migrate::run_migrations`](crate::migrate::run_migrations)
/// (`sef init`).
pub struct SqliteMedium {
    pool: sqlx::SqlitePool,
}

impl SqliteMedium {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageMedium for SqliteMedium {
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO records (key, body, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(bytes)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let body: Option<Vec<u8>> = sqlx::query_scalar("SELECT body FROM records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(body)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let found: bool =
            sqlx::query_scalar("SELECT COUNT(*) > 0 FROM records WHERE key = ?")
                .bind(key)
                .fetch_one(&self.pool)
                .await?;
        Ok(found)
    }
}

/// In-process medium for unit tests and embedded use.
#[derive(Default)]
pub struct MemoryMedium {
    entries: tokio::sync::RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StorageMedium for MemoryMedium {
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }
}
