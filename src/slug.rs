//! Friendly-title slugging and site path normalization.
//!
//! [`slugify`] turns a display name into the URL-safe segment used inside
//! derived SEF paths. [`normalize_path`] reduces an incoming URL or path to
//! the site-relative form that all storage keys and comparisons use.

/// Transform free text into a lowercase, hyphen-separated slug.
///
/// Alphanumeric characters are kept (lowercased); every other character is
/// treated as a separator, and separator runs collapse to a single hyphen.
/// Leading and trailing separators are dropped. Empty input yields an
/// empty slug.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Normalize a URL or bare path to a site-relative path.
///
/// Absolute URLs must live under `base_url`; anything under a different
/// origin returns `None`. The query string and fragment are dropped, a
/// leading `/` is guaranteed, and trailing slashes are trimmed (the root
/// path `/` stays `/`).
pub fn normalize_path(input: &str, base_url: &str) -> Option<String> {
    let raw = if input.starts_with("http://") || input.starts_with("https://") {
        let base = base_url.trim_end_matches('/');
        let rest = input.strip_prefix(base)?;
        // Guard against prefix-of-host matches (https://example.org.evil/...)
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        rest
    } else {
        input
    };

    let raw = raw
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    let mut path = if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw)
    };

    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    Some(path)
}

/// Build the absolute URL for a site-relative path.
pub fn absolute_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.org/";

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  A  --  B  "), "a-b");
        assert_eq!(slugify("one_two three"), "one-two-three");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_unicode_lowercased() {
        assert_eq!(slugify("Über Straße"), "über-straße");
    }

    #[test]
    fn test_normalize_bare_path() {
        assert_eq!(normalize_path("/blog/1-a", BASE).unwrap(), "/blog/1-a");
        assert_eq!(normalize_path("blog/1-a", BASE).unwrap(), "/blog/1-a");
    }

    #[test]
    fn test_normalize_strips_query_and_fragment() {
        assert_eq!(
            normalize_path("/blog/1-a?page=2#top", BASE).unwrap(),
            "/blog/1-a"
        );
    }

    #[test]
    fn test_normalize_trailing_slash() {
        assert_eq!(normalize_path("/blog/1-a/", BASE).unwrap(), "/blog/1-a");
        assert_eq!(normalize_path("/", BASE).unwrap(), "/");
        assert_eq!(normalize_path("", BASE).unwrap(), "/");
    }

    #[test]
    fn test_normalize_absolute_url_under_site() {
        assert_eq!(
            normalize_path("https://example.org/blog/1-a", BASE).unwrap(),
            "/blog/1-a"
        );
        assert_eq!(normalize_path("https://example.org/", BASE).unwrap(), "/");
        assert_eq!(normalize_path("https://example.org", BASE).unwrap(), "/");
    }

    #[test]
    fn test_normalize_foreign_origin() {
        assert!(normalize_path("https://elsewhere.net/blog/1-a", BASE).is_none());
        assert!(normalize_path("https://example.org.evil/blog", BASE).is_none());
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url(BASE, "/blog/1-a"), "https://example.org/blog/1-a");
        assert_eq!(
            absolute_url("https://example.org", "/blog/1-a"),
            "https://example.org/blog/1-a"
        );
    }
}
