//! Metadata-discovery extension point.
//!
//! Discovery handlers contribute extra metatags (Open Graph, Twitter
//! cards, schema.org hints, …) to a record as it is derived. Handlers are
//! invoked in registration order with the entity snapshot and the proposed
//! absolute SEF URL; for any given tag name, the first handler to return a
//! non-empty value wins. Admin-locked precedence is applied later, at
//! merge time.
//!
//! # Usage
//!
//! ```rust
//! use sefmap::discovery::DiscoveryRegistry;
//!
//! let mut discovery = DiscoveryRegistry::with_builtins();
//! // discovery.register(Box::new(MyDiscovery::new()));
//! ```

use std::collections::BTreeMap;

use crate::models::{Entity, EntityKind};

/// A pluggable metadata-discovery handler.
///
/// Implementations compute tag name→value pairs from the entity snapshot;
/// they perform no I/O and must not fail. An entity they cannot handle
/// simply yields an empty map.
pub trait MetadataDiscovery: Send + Sync {
    /// Handler name, for logs and listings.
    fn name(&self) -> &str;

    /// Produce metatags for `entity`, whose page will live at `sef_url`.
    fn discover(&self, entity: &Entity, sef_url: &str) -> BTreeMap<String, String>;
}

/// Ordered registry of discovery handlers.
///
/// Registration order is the merge order: earlier handlers win for a given
/// tag name unless they returned an empty value.
pub struct DiscoveryRegistry {
    handlers: Vec<Box<dyn MetadataDiscovery>>,
}

impl DiscoveryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Create a registry pre-loaded with the built-in Open Graph handler.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(OpenGraphDiscovery));
        registry
    }

    /// Register a handler. Later registrations have lower precedence.
    pub fn register(&mut self, handler: Box<dyn MetadataDiscovery>) {
        self.handlers.push(handler);
    }

    /// Get all registered handlers.
    pub fn handlers(&self) -> &[Box<dyn MetadataDiscovery>] {
        &self.handlers
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Run every handler in registration order and merge the results.
    /// First non-empty value for a tag name wins.
    pub fn collect(&self, entity: &Entity, sef_url: &str) -> BTreeMap<String, String> {
        let mut merged: BTreeMap<String, String> = BTreeMap::new();

        for handler in &self.handlers {
            for (name, value) in handler.discover(entity, sef_url) {
                let slot = merged.entry(name).or_default();
                if slot.is_empty() {
                    *slot = value;
                }
            }
        }

        merged
    }
}

impl Default for DiscoveryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in Open Graph handler: og:title, og:description, og:url, og:type.
pub struct OpenGraphDiscovery;

impl MetadataDiscovery for OpenGraphDiscovery {
    fn name(&self) -> &str {
        "opengraph"
    }

    fn discover(&self, entity: &Entity, sef_url: &str) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();

        if !entity.display_name.is_empty() {
            tags.insert("og:title".to_string(), entity.display_name.clone());
        }
        if !entity.description.is_empty() {
            tags.insert("og:description".to_string(), entity.description.clone());
        }
        if !sef_url.is_empty() {
            tags.insert("og:url".to_string(), sef_url.to_string());
        }

        let og_type = match entity.kind {
            EntityKind::User => "profile",
            EntityKind::Group | EntityKind::Object | EntityKind::Other => "website",
        };
        tags.insert("og:type".to_string(), og_type.to_string());

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> Entity {
        Entity {
            guid: 123,
            kind: EntityKind::Object,
            subtype: Some("blog".to_string()),
            username: None,
            display_name: "Hello, World!".to_string(),
            description: "First post.".to_string(),
            tags: vec![],
            owner_guid: 7,
            container_guid: 7,
            path: "/object/123".to_string(),
        }
    }

    struct FixedDiscovery {
        name: &'static str,
        tags: Vec<(&'static str, &'static str)>,
    }

    impl MetadataDiscovery for FixedDiscovery {
        fn name(&self) -> &str {
            self.name
        }

        fn discover(&self, _entity: &Entity, _sef_url: &str) -> BTreeMap<String, String> {
            self.tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }
    }

    #[test]
    fn test_opengraph_tags() {
        let tags = OpenGraphDiscovery.discover(&entity(), "https://example.org/blog/123-hello-world");
        assert_eq!(tags["og:title"], "Hello, World!");
        assert_eq!(tags["og:description"], "First post.");
        assert_eq!(tags["og:url"], "https://example.org/blog/123-hello-world");
        assert_eq!(tags["og:type"], "website");
    }

    #[test]
    fn test_first_non_empty_value_wins() {
        let mut registry = DiscoveryRegistry::new();
        registry.register(Box::new(FixedDiscovery {
            name: "first",
            tags: vec![("a", "1"), ("b", "")],
        }));
        registry.register(Box::new(FixedDiscovery {
            name: "second",
            tags: vec![("a", "2"), ("b", "2"), ("c", "2")],
        }));

        let merged = registry.collect(&entity(), "");
        assert_eq!(merged["a"], "1");
        assert_eq!(merged["b"], "2");
        assert_eq!(merged["c"], "2");
    }

    #[test]
    fn test_builtins_registered_first() {
        let registry = DiscoveryRegistry::with_builtins();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.handlers()[0].name(), "opengraph");
    }
}
