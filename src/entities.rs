//! Read-only entity data source.
//!
//! The host's entity model is external; this module defines the narrow
//! interface the derivation pipeline consumes, plus a JSON-file-backed
//! implementation that the batch driver and tests use in place of a live
//! host database.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::models::Entity;

/// Read-only access to host entities.
pub trait EntitySource: Send + Sync {
    /// Fetch a single entity snapshot by guid.
    fn entity(&self, guid: i64) -> Option<Entity>;

    /// All entities, ordered by ascending guid (batch regeneration order).
    fn all(&self) -> Vec<Entity>;
}

/// Entity source backed by a JSON array of entity snapshots.
pub struct JsonEntitySource {
    by_guid: HashMap<i64, Entity>,
}

impl JsonEntitySource {
    /// Load entities from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read entities file: {}", path.display()))?;
        let entities: Vec<Entity> =
            serde_json::from_str(&content).with_context(|| "Failed to parse entities file")?;
        Ok(Self::from_entities(entities))
    }

    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let by_guid = entities.into_iter().map(|e| (e.guid, e)).collect();
        Self { by_guid }
    }

    pub fn len(&self) -> usize {
        self.by_guid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_guid.is_empty()
    }
}

impl EntitySource for JsonEntitySource {
    fn entity(&self, guid: i64) -> Option<Entity> {
        self.by_guid.get(&guid).cloned()
    }

    fn all(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.by_guid.values().cloned().collect();
        entities.sort_by_key(|e| e.guid);
        entities
    }
}
