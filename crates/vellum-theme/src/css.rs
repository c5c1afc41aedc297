//! Stylesheet resolution: link extraction and cycle-safe `@import`
//! inlining.
//!
//! Legacy bundles reference stylesheets from their template HTML, and
//! those stylesheets can `@import` further files. Referenced bodies are
//! concatenated depth-first; a visited set keyed by resolved archive path
//! guards against import cycles and duplicate inlining.

use crate::archive::{resolve_path, ThemeArchive};
use regex::Regex;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;
use tracing::{debug, warn};

static LINK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<link\b[^>]*>").unwrap());

static REL_STYLESHEET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\brel\s*=\s*["']?stylesheet["']?"#).unwrap());

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]+)"|'([^']+)'|([^\s>]+))"#).unwrap());

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)@import\s+(?:url\(\s*)?["']?([^"'()\s;]+)["']?\s*\)?[^;\n]*;?"#).unwrap()
});

fn is_remote(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

/// Extract relative stylesheet hrefs from `<link rel="stylesheet">` tags,
/// in document order. Absolute and protocol-relative URLs are skipped.
pub(crate) fn stylesheet_hrefs(html: &str) -> Vec<String> {
    let mut hrefs = Vec::new();
    for tag in LINK_TAG_RE.find_iter(html) {
        let tag = tag.as_str();
        if !REL_STYLESHEET_RE.is_match(tag) {
            continue;
        }
        let Some(caps) = HREF_RE.captures(tag) else {
            continue;
        };
        let href = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if href.is_empty() || is_remote(href) {
            continue;
        }
        hrefs.push(href.to_string());
    }
    hrefs
}

/// Relative `@import` targets of a stylesheet body, in order.
pub(crate) fn import_paths(css: &str) -> Vec<String> {
    IMPORT_RE
        .captures_iter(css)
        .map(|c| c[1].to_string())
        .filter(|p| !is_remote(p))
        .collect()
}

/// Remove `@import` statements from a stylesheet body.
pub(crate) fn strip_imports(css: &str) -> String {
    IMPORT_RE.replace_all(css, "").into_owned()
}

/// Inline one stylesheet and, depth-first, everything it imports.
///
/// Imported bodies land ahead of the importing file's own body, which is
/// appended with its `@import` statements stripped. `visited` is keyed by
/// the resolved archive path; a path already present is not processed
/// again, which both terminates import cycles and prevents duplicate
/// inlining. References that do not resolve to an archive entry are
/// skipped.
pub(crate) fn inline_stylesheet<'a>(
    archive: &'a dyn ThemeArchive,
    base_dir: &'a str,
    rel_path: String,
    visited: &'a mut HashSet<String>,
    out: &'a mut String,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        let full_path = resolve_path(base_dir, &rel_path);
        if !visited.insert(full_path.clone()) {
            return;
        }
        if !archive.contains_file(&full_path) {
            debug!("stylesheet reference not in archive, skipping: {full_path}");
            return;
        }
        let body = match archive.read_text(&full_path).await {
            Ok(body) => body,
            Err(e) => {
                warn!("failed to read stylesheet {full_path}: {e}");
                return;
            }
        };
        for import in import_paths(&body) {
            inline_stylesheet(archive, base_dir, import, visited, out).await;
        }
        out.push_str(&strip_imports(&body));
        out.push('\n');
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::archive_of;

    #[test]
    fn hrefs_found_in_any_attribute_order() {
        let html = r#"
            <link rel="stylesheet" href="a.css">
            <link href="b.css" rel="stylesheet" type="text/css">
            <link rel="icon" href="favicon.ico">
        "#;
        assert_eq!(stylesheet_hrefs(html), vec!["a.css", "b.css"]);
    }

    #[test]
    fn hrefs_skip_absolute_urls() {
        let html = r#"
            <link rel="stylesheet" href="https://cdn.test/x.css">
            <link rel="stylesheet" href="//cdn.test/y.css">
            <link rel="stylesheet" href="local.css">
        "#;
        assert_eq!(stylesheet_hrefs(html), vec!["local.css"]);
    }

    #[test]
    fn import_paths_handles_common_forms() {
        let css = r#"
            @import "plain.css";
            @import 'single.css';
            @import url(unquoted.css);
            @import url("quoted.css") screen;
            @import "https://cdn.test/remote.css";
        "#;
        assert_eq!(
            import_paths(css),
            vec!["plain.css", "single.css", "unquoted.css", "quoted.css"]
        );
    }

    #[test]
    fn strip_imports_leaves_rules() {
        let out = strip_imports("@import \"a.css\";\nbody { margin: 0; }");
        assert!(!out.contains("@import"));
        assert!(out.contains("body { margin: 0; }"));
    }

    #[tokio::test]
    async fn inlines_imports_depth_first() {
        let archive = archive_of(&[
            ("a.css", b"@import \"b.css\";\n.a { color: red; }" as &[u8]),
            ("b.css", b".b { color: blue; }"),
        ]);
        let mut visited = HashSet::new();
        let mut out = String::new();
        inline_stylesheet(&archive, "", "a.css".into(), &mut visited, &mut out).await;

        assert!(out.contains(".a { color: red; }"));
        assert!(out.contains(".b { color: blue; }"));
        assert!(!out.contains("@import"));
        // imported body comes first
        assert!(out.find(".b").unwrap() < out.find(".a").unwrap());
    }

    #[tokio::test]
    async fn import_cycles_terminate_with_each_body_once() {
        let archive = archive_of(&[
            ("a.css", b"@import \"b.css\";\n.a {}" as &[u8]),
            ("b.css", b"@import \"a.css\";\n.b {}"),
        ]);
        let mut visited = HashSet::new();
        let mut out = String::new();
        inline_stylesheet(&archive, "", "a.css".into(), &mut visited, &mut out).await;

        assert_eq!(out.matches(".a {}").count(), 1);
        assert_eq!(out.matches(".b {}").count(), 1);
        assert!(!out.contains("@import"));
    }

    #[tokio::test]
    async fn missing_import_is_skipped() {
        let archive = archive_of(&[("a.css", b"@import \"ghost.css\";\n.a {}" as &[u8])]);
        let mut visited = HashSet::new();
        let mut out = String::new();
        inline_stylesheet(&archive, "", "a.css".into(), &mut visited, &mut out).await;

        assert!(out.contains(".a {}"));
        assert!(!out.contains("@import"));
    }

    #[tokio::test]
    async fn duplicate_reference_inlined_once() {
        let archive = archive_of(&[
            ("a.css", b"@import \"shared.css\";\n.a {}" as &[u8]),
            ("b.css", b"@import \"shared.css\";\n.b {}"),
            ("shared.css", b".shared {}"),
        ]);
        let mut visited = HashSet::new();
        let mut out = String::new();
        inline_stylesheet(&archive, "", "a.css".into(), &mut visited, &mut out).await;
        inline_stylesheet(&archive, "", "b.css".into(), &mut visited, &mut out).await;

        assert_eq!(out.matches(".shared {}").count(), 1);
    }
}
