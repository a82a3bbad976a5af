//! Record derivation and merge precedence.
//!
//! [`derive_record`] builds a fresh [`SefRecord`] from an entity snapshot:
//! the SEF path by entity kind, page metadata from the entity's
//! attributes, recursively embedded owner/container records, and metatags
//! from the discovery registry. [`merge_records`] then reconciles the
//! derived record with whatever is already stored, under admin-locked
//! precedence.

use std::collections::HashSet;

use crate::discovery::DiscoveryRegistry;
use crate::entities::EntitySource;
use crate::models::{Entity, EntityKind, SefRecord};
use crate::slug::{absolute_url, slugify};

/// Derive a record from an entity snapshot, or `None` when the entity has
/// no usable location (an empty path, or the site root, which is excluded
/// from mapping).
///
/// Derivation never fails on missing optional attributes; absent values
/// become empty strings.
pub fn derive_record(
    entity: &Entity,
    source: &dyn EntitySource,
    discovery: &DiscoveryRegistry,
    base_url: &str,
) -> Option<SefRecord> {
    let mut visited = HashSet::new();
    derive_inner(entity, source, discovery, base_url, &mut visited)
}

/// Recursive worker. The visited set guards against cyclic
/// owner/container graphs in the host model: a guid seen once terminates
/// that branch.
fn derive_inner(
    entity: &Entity,
    source: &dyn EntitySource,
    discovery: &DiscoveryRegistry,
    base_url: &str,
    visited: &mut HashSet<i64>,
) -> Option<SefRecord> {
    if entity.path.is_empty() || entity.path == "/" {
        return None;
    }
    if !visited.insert(entity.guid) {
        return None;
    }

    let sef_path = sef_path_for(entity);

    let mut record = SefRecord {
        path: entity.path.clone(),
        sef_path: sef_path.clone(),
        title: entity.display_name.clone(),
        description: entity.description.clone(),
        keywords: entity.tags.join(","),
        guid: Some(entity.guid),
        ..Default::default()
    };

    if entity.owner_guid != 0 && entity.owner_guid != entity.guid {
        if let Some(owner) = source.entity(entity.owner_guid) {
            record.owner =
                derive_inner(&owner, source, discovery, base_url, visited).map(Box::new);
        }
    }

    if entity.container_guid != 0
        && entity.container_guid != entity.guid
        && entity.container_guid != entity.owner_guid
    {
        if let Some(container) = source.entity(entity.container_guid) {
            record.container =
                derive_inner(&container, source, discovery, base_url, visited).map(Box::new);
        }
    }

    record.metatags = discovery.collect(entity, &absolute_url(base_url, &sef_path));

    Some(record)
}

/// The friendly path for an entity, by kind.
///
/// Users map to `/profile/{username}`; groups and objects map to
/// `/{subtype-or-kind}/{guid}-{slug}`. Everything else keeps its
/// canonical path (identity mapping).
fn sef_path_for(entity: &Entity) -> String {
    match entity.kind {
        EntityKind::User => match entity.username.as_deref() {
            Some(username) if !username.is_empty() => format!("/profile/{}", username),
            _ => entity.path.clone(),
        },
        EntityKind::Group | EntityKind::Object => {
            let prefix = entity
                .subtype
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(match entity.kind {
                    EntityKind::Group => "group",
                    _ => "object",
                });
            format!("/{}/{}-{}", prefix, entity.guid, slugify(&entity.display_name))
        }
        EntityKind::Other => entity.path.clone(),
    }
}

/// Reconcile a freshly derived record with the stored one.
///
/// Without an admin-defined stored record, derived fields replace stored
/// ones; metatags merge key-by-key (derived value wins per key, stored
/// keys the derivation did not produce survive). With an admin-defined
/// record, every stored non-empty field is kept and only empty fields are
/// filled from the derivation, the paths included. Locked paths never
/// re-derive.
pub fn merge_records(existing: Option<SefRecord>, derived: SefRecord) -> SefRecord {
    match existing {
        None => derived,
        Some(existing) if !existing.admin_defined => {
            let mut merged = derived;
            for (name, value) in existing.metatags {
                merged.metatags.entry(name).or_insert(value);
            }
            merged
        }
        Some(mut existing) => {
            if existing.path.is_empty() {
                existing.path = derived.path;
            }
            if existing.sef_path.is_empty() {
                existing.sef_path = derived.sef_path;
            }
            if existing.title.is_empty() {
                existing.title = derived.title;
            }
            if existing.description.is_empty() {
                existing.description = derived.description;
            }
            if existing.keywords.is_empty() {
                existing.keywords = derived.keywords;
            }
            if existing.guid.is_none() {
                existing.guid = derived.guid;
            }
            if existing.owner.is_none() {
                existing.owner = derived.owner;
            }
            if existing.container.is_none() {
                existing.container = derived.container;
            }
            for (name, value) in derived.metatags {
                let slot = existing.metatags.entry(name).or_default();
                if slot.is_empty() {
                    *slot = value;
                }
            }
            existing
        }
    }
}
