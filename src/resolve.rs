//! Path resolution in both directions, plus page metadata lookup.
//!
//! Canonical→friendly ([`sef_url`]) serves outbound link rendering;
//! friendly→canonical ([`route_rewrite`]) lets the router substitute an
//! inbound SEF path with canonical routing segments before dispatch;
//! [`page_metadata`] feeds the page head of whatever URL is being
//! rendered.
//!
//! Misses and structural no-match cases are return-value signals. Only
//! medium faults surface as [`StoreError`]; callers that can proceed
//! without a rewrite are expected to fall back to the original path.

use crate::models::{PageMetadata, RouteTarget};
use crate::slug::normalize_path;
use crate::store::{MappingStore, StoreError};

/// Canonical→friendly: the SEF equivalent of `input`, or `input` unchanged
/// when no mapping with a non-empty SEF path exists.
pub async fn sef_url(
    store: &MappingStore,
    base_url: &str,
    input: &str,
) -> Result<String, StoreError> {
    let Some(path) = normalize_path(input, base_url) else {
        return Ok(input.to_string());
    };

    match store.get(&path).await? {
        Some(record) if !record.sef_path.is_empty() => {
            Ok(normalize_path(&record.sef_path, base_url).unwrap_or(record.sef_path))
        }
        _ => Ok(input.to_string()),
    }
}

/// Friendly→canonical: routing segments for an inbound path.
///
/// The stored record must match the incoming path exactly on its
/// normalized SEF path; a record found under a coincidentally matching
/// canonical hash is not a rewrite. `None` means "no rewrite" and the
/// caller routes the original path.
pub async fn route_rewrite(
    store: &MappingStore,
    base_url: &str,
    input: &str,
) -> Result<Option<RouteTarget>, StoreError> {
    let Some(path) = normalize_path(input, base_url) else {
        return Ok(None);
    };

    let Some(record) = store.get(&path).await? else {
        return Ok(None);
    };

    if normalize_path(&record.sef_path, base_url).as_deref() != Some(path.as_str()) {
        return Ok(None);
    }

    let mut segments: Vec<String> = record
        .path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if segments.is_empty() {
        return Ok(None);
    }

    let identifier = segments.remove(0);
    Ok(Some(RouteTarget {
        handler: identifier.clone(),
        identifier,
        segments,
    }))
}

/// Page-head metadata for the page at `input`, or `None` when unmapped.
///
/// Metatag entries with empty values are dropped; the renderer emits only
/// tags that have content.
pub async fn page_metadata(
    store: &MappingStore,
    base_url: &str,
    input: &str,
) -> Result<Option<PageMetadata>, StoreError> {
    let Some(path) = normalize_path(input, base_url) else {
        return Ok(None);
    };

    let Some(record) = store.get(&path).await? else {
        return Ok(None);
    };

    Ok(Some(PageMetadata {
        title: record.title,
        description: record.description,
        keywords: record.keywords,
        metatags: record
            .metatags
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryMedium;
    use crate::models::SefRecord;
    use std::sync::Arc;

    const BASE: &str = "https://example.org/";

    fn store() -> MappingStore {
        MappingStore::new(Arc::new(MemoryMedium::new()))
    }

    fn blog_record() -> SefRecord {
        SefRecord {
            path: "/object/123".to_string(),
            sef_path: "/blog/123-hello-world".to_string(),
            title: "Hello, World!".to_string(),
            description: "First post.".to_string(),
            keywords: "rust,web".to_string(),
            guid: Some(123),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sef_url_found() {
        let store = store();
        store.put(&blog_record()).await.unwrap();

        let url = sef_url(&store, BASE, "/object/123").await.unwrap();
        assert_eq!(url, "/blog/123-hello-world");

        // Absolute input resolves through the same normalization.
        let url = sef_url(&store, BASE, "https://example.org/object/123")
            .await
            .unwrap();
        assert_eq!(url, "/blog/123-hello-world");
    }

    #[tokio::test]
    async fn test_sef_url_passthrough() {
        let store = store();
        assert_eq!(
            sef_url(&store, BASE, "/object/999").await.unwrap(),
            "/object/999"
        );
        // Foreign origin is never rewritten.
        assert_eq!(
            sef_url(&store, BASE, "https://elsewhere.net/x").await.unwrap(),
            "https://elsewhere.net/x"
        );
    }

    #[tokio::test]
    async fn test_route_rewrite_matches_sef_path() {
        let store = store();
        store.put(&blog_record()).await.unwrap();

        let target = route_rewrite(&store, BASE, "/blog/123-hello-world")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target.identifier, "object");
        assert_eq!(target.segments, vec!["123"]);
        assert_eq!(target.handler, "object");
    }

    #[tokio::test]
    async fn test_route_rewrite_rejects_canonical_side_hit() {
        let store = store();
        store.put(&blog_record()).await.unwrap();

        // The record is reachable under the canonical hash, but its SEF
        // path differs from the incoming path: no rewrite.
        assert!(route_rewrite(&store, BASE, "/object/123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_route_rewrite_no_match_passthrough() {
        let store = store();
        assert!(route_rewrite(&store, BASE, "/blog/404-missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_resolution_symmetry() {
        let store = store();
        store.put(&blog_record()).await.unwrap();

        let friendly = sef_url(&store, BASE, "/object/123").await.unwrap();
        let target = route_rewrite(&store, BASE, &friendly)
            .await
            .unwrap()
            .unwrap();

        let mut roundtrip = vec![target.identifier];
        roundtrip.extend(target.segments);
        assert_eq!(roundtrip.join("/"), "object/123");
    }

    #[tokio::test]
    async fn test_identity_mapping_routes_to_itself() {
        let store = store();
        store
            .put(&SefRecord::identity("/profile/alice"))
            .await
            .unwrap();

        let target = route_rewrite(&store, BASE, "/profile/alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(target.identifier, "profile");
        assert_eq!(target.segments, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_page_metadata() {
        let store = store();
        let mut record = blog_record();
        record
            .metatags
            .insert("og:title".to_string(), "Hello, World!".to_string());
        record.metatags.insert("og:locale".to_string(), String::new());
        store.put(&record).await.unwrap();

        let meta = page_metadata(&store, BASE, "https://example.org/blog/123-hello-world")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.title, "Hello, World!");
        assert_eq!(meta.keywords, "rust,web");
        assert_eq!(meta.metatags["og:title"], "Hello, World!");
        // Empty-valued tags are dropped.
        assert!(!meta.metatags.contains_key("og:locale"));

        assert!(page_metadata(&store, BASE, "/unmapped")
            .await
            .unwrap()
            .is_none());
    }
}
