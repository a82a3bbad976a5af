//! Regeneration pipeline.
//!
//! [`on_entity_changed`] is the synchronous entry point the host's
//! create/update events call once per changed entity: derive → merge with
//! the stored record → put. [`run_autogen`] is the batch driver over the
//! configured entity source; it counts successes against attempts and
//! keeps going past per-record write failures.

use anyhow::Result;

use crate::config::Config;
use crate::derive::{derive_record, merge_records};
use crate::discovery::DiscoveryRegistry;
use crate::entities::{EntitySource, JsonEntitySource};
use crate::medium;
use crate::models::Entity;
use crate::store::{MappingStore, StoreError};

/// Refresh the stored record for one entity.
///
/// Returns `Ok(true)` when a record was written, `Ok(false)` when the
/// entity has no usable location (empty path or site root).
pub async fn on_entity_changed(
    store: &MappingStore,
    source: &dyn EntitySource,
    discovery: &DiscoveryRegistry,
    base_url: &str,
    entity: &Entity,
) -> Result<bool, StoreError> {
    let Some(derived) = derive_record(entity, source, discovery, base_url) else {
        return Ok(false);
    };

    let existing = store.get(&derived.path).await?;
    let merged = merge_records(existing, derived);
    store.put(&merged).await?;

    Ok(true)
}

/// Regenerate records for every entity in the configured source.
pub async fn run_autogen(config: &Config, dry_run: bool, limit: Option<usize>) -> Result<()> {
    let Some(entities_config) = &config.entities else {
        anyhow::bail!("No [entities] source configured; autogen needs one");
    };

    let source = JsonEntitySource::load(&entities_config.path)?;
    let discovery = DiscoveryRegistry::with_builtins();
    let base_url = &config.site.base_url;

    let mut entities = source.all();
    if let Some(lim) = limit {
        entities.truncate(lim);
    }

    if dry_run {
        let derivable = entities
            .iter()
            .filter(|entity| derive_record(entity, &source, &discovery, base_url).is_some())
            .count();
        println!("autogen (dry-run)");
        println!("  entities: {}", entities.len());
        println!("  would regenerate: {}", derivable);
        return Ok(());
    }

    let store = MappingStore::new(medium::from_config(config).await?);

    let mut regenerated = 0u64;
    let mut skipped = 0u64;
    let mut failed = 0u64;

    for entity in &entities {
        match on_entity_changed(&store, &source, &discovery, base_url, entity).await {
            Ok(true) => regenerated += 1,
            Ok(false) => skipped += 1,
            Err(e) => {
                // A lost record must not abort the batch.
                failed += 1;
                tracing::warn!(guid = entity.guid, error = %e, "autogen failed for entity");
            }
        }
    }

    println!("autogen");
    println!("  entities: {}", entities.len());
    println!("  regenerated: {}", regenerated);
    println!("  skipped: {}", skipped);
    if failed > 0 {
        println!("  failed: {}", failed);
    }
    println!("ok");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryMedium;
    use crate::models::EntityKind;
    use std::sync::Arc;

    const BASE: &str = "https://example.org/";

    fn blog_entity() -> Entity {
        Entity {
            guid: 123,
            kind: EntityKind::Object,
            subtype: Some("blog".to_string()),
            username: None,
            display_name: "Hello, World!".to_string(),
            description: "First post.".to_string(),
            tags: vec!["rust".to_string()],
            owner_guid: 0,
            container_guid: 0,
            path: "/object/123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_on_entity_changed_writes_record() {
        let store = MappingStore::new(Arc::new(MemoryMedium::new()));
        let source = JsonEntitySource::from_entities(vec![]);
        let discovery = DiscoveryRegistry::new();

        let written = on_entity_changed(&store, &source, &discovery, BASE, &blog_entity())
            .await
            .unwrap();
        assert!(written);

        let record = store.get("/object/123").await.unwrap().unwrap();
        assert_eq!(record.sef_path, "/blog/123-hello-world");
    }

    #[tokio::test]
    async fn test_on_entity_changed_skips_root() {
        let store = MappingStore::new(Arc::new(MemoryMedium::new()));
        let source = JsonEntitySource::from_entities(vec![]);
        let discovery = DiscoveryRegistry::new();

        let mut entity = blog_entity();
        entity.path = "/".to_string();

        let written = on_entity_changed(&store, &source, &discovery, BASE, &entity)
            .await
            .unwrap();
        assert!(!written);
        assert!(store.get("/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_on_entity_changed_respects_admin_lock() {
        let store = MappingStore::new(Arc::new(MemoryMedium::new()));
        let source = JsonEntitySource::from_entities(vec![]);
        let discovery = DiscoveryRegistry::new();

        let entity = blog_entity();
        on_entity_changed(&store, &source, &discovery, BASE, &entity)
            .await
            .unwrap();

        // Admin locks the record with a curated title.
        let mut locked = store.get("/object/123").await.unwrap().unwrap();
        locked.title = "Curated".to_string();
        locked.admin_defined = true;
        store.put(&locked).await.unwrap();

        // The entity is renamed; regeneration must not touch the title.
        let mut renamed = entity.clone();
        renamed.display_name = "Renamed".to_string();
        on_entity_changed(&store, &source, &discovery, BASE, &renamed)
            .await
            .unwrap();

        let record = store.get("/object/123").await.unwrap().unwrap();
        assert_eq!(record.title, "Curated");
        assert!(record.admin_defined);
    }

    #[tokio::test]
    async fn test_on_entity_changed_unlocked_rederives() {
        let store = MappingStore::new(Arc::new(MemoryMedium::new()));
        let source = JsonEntitySource::from_entities(vec![]);
        let discovery = DiscoveryRegistry::new();

        let entity = blog_entity();
        on_entity_changed(&store, &source, &discovery, BASE, &entity)
            .await
            .unwrap();

        let mut renamed = entity.clone();
        renamed.display_name = "Renamed".to_string();
        on_entity_changed(&store, &source, &discovery, BASE, &renamed)
            .await
            .unwrap();

        let record = store.get("/object/123").await.unwrap().unwrap();
        assert_eq!(record.title, "Renamed");
        assert_eq!(record.sef_path, "/blog/123-renamed");
    }
}
