//! Core data models used throughout sefmap.
//!
//! These types represent the entity snapshots, persisted SEF records, and
//! resolution results that flow through the derivation and routing pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of source entity, mirroring the host model's type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Group,
    Object,
    /// Anything the host model exposes that has no friendly-path rule.
    Other,
}

/// Read-only snapshot of a host entity.
///
/// The host's entity model is an external collaborator; sefmap only ever
/// reads these fields. Optional attributes default to empty values so a
/// sparse snapshot never aborts derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub guid: i64,
    pub kind: EntityKind,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owner guid; 0 means unowned.
    #[serde(default)]
    pub owner_guid: i64,
    /// Container guid; 0 means uncontained.
    #[serde(default)]
    pub container_guid: i64,
    /// Canonical site-relative location path (e.g. `/object/123`).
    pub path: String,
}

/// The persisted mapping + metadata unit, stored under the hashes of both
/// its canonical and its SEF path.
///
/// The flat `sef_path`-at-top-level shape is the canonical on-disk form;
/// nested `owner`/`container` records are enrichment only and never used
/// as a resolution key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SefRecord {
    /// Canonical site-relative path. Never empty, never `/`.
    pub path: String,
    /// Friendly site-relative path. May equal `path` (identity mapping).
    pub sef_path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Comma-joined entity tags.
    #[serde(default)]
    pub keywords: String,
    /// Free-form name/value pairs from discovery handlers or admin edits.
    #[serde(default)]
    pub metatags: BTreeMap<String, String>,
    /// Source entity guid, when the record was derived from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<i64>,
    /// Record for the owning entity, when distinct from the entity itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Box<SefRecord>>,
    /// Record for the containing entity, when distinct from both the
    /// entity and its owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Box<SefRecord>>,
    /// True once an administrator has edited this record. Regeneration
    /// then only fills fields left empty.
    #[serde(default)]
    pub admin_defined: bool,
}

impl SefRecord {
    /// A minimal identity-mapped record for `path` (used as the base of
    /// an admin edit when nothing is stored yet).
    pub fn identity(path: &str) -> Self {
        Self {
            path: path.to_string(),
            sef_path: path.to_string(),
            ..Default::default()
        }
    }
}

/// Canonical routing target handed back to the router after a successful
/// friendly→canonical rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTarget {
    /// First segment of the canonical path.
    pub identifier: String,
    /// Remaining canonical path segments.
    pub segments: Vec<String>,
    /// Page handler id; equals the identifier.
    pub handler: String,
}

/// Page-head metadata handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    /// Extra metatags; entries with empty values are dropped.
    pub metatags: BTreeMap<String, String>,
}
