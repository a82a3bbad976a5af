use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub site: SiteConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub entities: Option<EntitiesConfig>,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Absolute site base URL (e.g. `https://example.org/`). Incoming
    /// absolute URLs are reduced to site-relative paths against it.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Storage backend: `filesystem` or `sqlite`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Records directory (filesystem) or database file (sqlite).
    pub path: PathBuf,
}

fn default_backend() -> String {
    "filesystem".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EntitiesConfig {
    /// JSON file with an array of entity snapshots for the batch driver.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate site
    if !config.site.base_url.starts_with("http://") && !config.site.base_url.starts_with("https://")
    {
        anyhow::bail!("site.base_url must be an absolute http(s) URL");
    }

    // Validate store
    match config.store.backend.as_str() {
        "filesystem" | "sqlite" => {}
        other => anyhow::bail!(
            "Unknown store backend: '{}'. Must be filesystem or sqlite.",
            other
        ),
    }
    if config.store.path.as_os_str().is_empty() {
        anyhow::bail!("store.path must not be empty");
    }

    Ok(config)
}
