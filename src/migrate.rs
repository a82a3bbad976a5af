use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Initialize the configured store backend. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    match config.store.backend.as_str() {
        "filesystem" => {
            std::fs::create_dir_all(&config.store.path)?;
        }
        "sqlite" => {
            let pool = db::connect(config).await?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS records (
                    key TEXT PRIMARY KEY,
                    body BLOB NOT NULL,
                    updated_at INTEGER NOT NULL
                )
                "#,
            )
            .execute(&pool)
            .await?;

            sqlx::query(
                "CREATE INDEX IF NOT EXISTS idx_records_updated_at ON records(updated_at DESC)",
            )
            .execute(&pool)
            .await?;

            pool.close().await;
        }
        other => anyhow::bail!("Unknown store backend: '{}'", other),
    }

    Ok(())
}
