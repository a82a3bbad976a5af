//! # sefmap CLI (`sef`)
//!
//! The `sef` binary is the primary interface for sefmap. It provides
//! commands for store initialization, batch record regeneration, both
//! resolution directions, page metadata lookup, admin edits, and starting
//! the HTTP resolution service.
//!
//! ## Usage
//!
//! ```bash
//! sef --config ./config/sef.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sef init` | Initialize the record store (sqlite schema or records directory) |
//! | `sef autogen` | Regenerate records for every entity in the configured source |
//! | `sef resolve <path>` | Rewrite a friendly inbound path to canonical routing segments |
//! | `sef url <path>` | Look up the SEF equivalent of a canonical path |
//! | `sef meta <url>` | Print the page-head metadata stored for a URL |
//! | `sef edit <path>` | Apply an admin edit and lock the record |
//! | `sef serve` | Start the HTTP resolution service |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the store
//! sef init --config ./config/sef.toml
//!
//! # Regenerate all records from the entity source
//! sef autogen --config ./config/sef.toml
//!
//! # Resolve an inbound friendly path
//! sef resolve /blog/123-hello-world --config ./config/sef.toml
//!
//! # Curate a record by hand (freezes the populated fields)
//! sef edit /object/123 --title "Hello" --tag robots=noindex --config ./config/sef.toml
//!
//! # Start the resolution service
//! sef serve --config ./config/sef.toml
//! ```

mod admin;
mod config;
mod db;
mod derive;
#[allow(dead_code)]
mod discovery;
#[allow(dead_code)]
mod entities;
#[allow(dead_code)]
mod medium;
mod migrate;
mod models;
mod refresh;
mod resolve;
mod server;
mod slug;
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::admin::AdminEdit;
use crate::store::MappingStore;

/// sefmap CLI — a content-addressed SEF path mapping and page metadata
/// store.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/sef.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "sef",
    about = "sefmap — a content-addressed SEF path mapping and page metadata store",
    version,
    long_about = "sefmap maintains a bidirectional mapping between canonical resource paths \
    and search-engine-friendly equivalents, derives per-path page metadata from host entities, \
    and resolves inbound friendly paths back to canonical routing segments."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/sef.toml`. Site, store, entity-source, and
    /// server settings are read from this file.
    #[arg(long, global = true, default_value = "./config/sef.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the record store.
    ///
    /// Creates the SQLite database and `records` table, or the records
    /// directory for the filesystem backend. This command is idempotent —
    /// running it multiple times is safe.
    Init,

    /// Regenerate records for every entity in the configured source.
    ///
    /// Derives a record per entity, merges it with the stored one under
    /// admin-locked precedence, and writes it under both path hashes.
    /// Per-record write failures are counted and do not abort the batch.
    Autogen {
        /// Show entity and record counts without writing to the store.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of entities to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rewrite a friendly inbound path to canonical routing segments.
    ///
    /// Prints the routing target as JSON, or "no rewrite" when the router
    /// should proceed with the original path unchanged.
    Resolve {
        /// Inbound site-relative path or absolute URL.
        path: String,
    },

    /// Look up the SEF equivalent of a canonical path.
    ///
    /// Prints the input unchanged when no mapping exists.
    Url {
        /// Canonical site-relative path or absolute URL.
        path: String,
    },

    /// Print the page-head metadata stored for a URL.
    Meta {
        /// Page URL or site-relative path.
        url: String,
    },

    /// Apply an admin edit to the record at a path.
    ///
    /// Overwrites the provided fields, fills in an identity mapping when
    /// nothing is stored yet, and locks the record against automatic
    /// overwrite.
    Edit {
        /// Canonical site-relative path or absolute URL.
        path: String,

        /// Friendly path to serve this record under.
        #[arg(long)]
        sef_path: Option<String>,

        /// Page title.
        #[arg(long)]
        title: Option<String>,

        /// Page description.
        #[arg(long)]
        description: Option<String>,

        /// Comma-separated keywords.
        #[arg(long)]
        keywords: Option<String>,

        /// Extra metatags as `name=content` pairs.
        #[arg(long = "tag", value_parser = parse_key_val)]
        tags: Vec<(String, String)>,
    },

    /// Start the HTTP resolution service.
    ///
    /// Exposes /resolve, /sef, and /meta for the host's routing and
    /// rendering layers.
    Serve,
}

/// Parse a `name=value` pair for `--tag` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid NAME=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Store initialized successfully.");
        }
        Commands::Autogen { dry_run, limit } => {
            refresh::run_autogen(&cfg, dry_run, limit).await?;
        }
        Commands::Resolve { path } => {
            let store = MappingStore::new(medium::from_config(&cfg).await?);
            match resolve::route_rewrite(&store, &cfg.site.base_url, &path).await? {
                Some(target) => println!("{}", serde_json::to_string_pretty(&target)?),
                None => println!("no rewrite for {}", path),
            }
        }
        Commands::Url { path } => {
            let store = MappingStore::new(medium::from_config(&cfg).await?);
            let sef_url = resolve::sef_url(&store, &cfg.site.base_url, &path).await?;
            println!("{}", sef_url);
        }
        Commands::Meta { url } => {
            let store = MappingStore::new(medium::from_config(&cfg).await?);
            match resolve::page_metadata(&store, &cfg.site.base_url, &url).await? {
                Some(meta) => println!("{}", serde_json::to_string_pretty(&meta)?),
                None => println!("no metadata for {}", url),
            }
        }
        Commands::Edit {
            path,
            sef_path,
            title,
            description,
            keywords,
            tags,
        } => {
            let store = MappingStore::new(medium::from_config(&cfg).await?);
            let edit = AdminEdit {
                sef_path,
                title,
                description,
                keywords,
                metatags: tags.into_iter().collect(),
            };
            match admin::apply_admin_edit(&store, &cfg.site.base_url, &path, edit).await? {
                Some(record) => {
                    println!("edited {} -> {}", record.path, record.sef_path);
                }
                None => println!("{} is not editable", path),
            }
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
