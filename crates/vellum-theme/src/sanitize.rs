//! CSS/HTML sanitization for untrusted theme content.
//!
//! Uploaded stylesheets and templates are authored outside the
//! application and are rendered against user documents, so every
//! script-execution vector is stripped before the content is stored.
//! Benign styling and markup pass through unchanged. The pipeline only
//! calls the two entry points; the rule set is internal.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// =============================================================================
// CSS RULES
// =============================================================================

/// IE-era `expression(...)` values, still a live vector in embedded views.
static CSS_EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)expression\s*\([^)]*\)").unwrap());

/// `behavior:` / `-moz-binding:` property bindings.
static CSS_BINDING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:-moz-binding|behavior)\s*:[^;}]*;?").unwrap());

/// `url(...)` wrapping a scriptable scheme.
static CSS_SCRIPT_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*["']?\s*(?:javascript:|vbscript:|data:text/html)[^)]*\)"#).unwrap()
});

/// `@import`/`@charset` statements. Imports are either already inlined by
/// the CSS pipeline or point outside the archive; neither may survive.
static CSS_AT_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)@(?:import|charset)\b[^;]*;?"#).unwrap());

// =============================================================================
// HTML RULES
// =============================================================================

static HTML_SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());

static HTML_ORPHAN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:script|iframe|object|embed)\b[^>]*>").unwrap());

static HTML_EMBED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:iframe|object|embed)\b[^>]*>.*?</(?:iframe|object|embed)>").unwrap()
});

/// Inline event handler attributes (`onclick=...`, `onload=...`).
static HTML_EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\son\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

/// URL-bearing attributes carrying a scriptable scheme.
static HTML_SCRIPT_URL_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\s(?:href|src|action|formaction)\s*=\s*(?:"\s*(?:javascript:|vbscript:|data:text/html)[^"]*"|'\s*(?:javascript:|vbscript:|data:text/html)[^']*'|(?:javascript:|vbscript:|data:text/html)[^\s>]*)"#,
    )
    .unwrap()
});

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Strip unsafe constructs from a stylesheet, preserving benign styling.
pub fn sanitize_css(raw: &str) -> String {
    let css = CSS_EXPRESSION_RE.replace_all(raw, "none");
    let css = CSS_BINDING_RE.replace_all(&css, "");
    let css = CSS_SCRIPT_URL_RE.replace_all(&css, "none");
    let css = CSS_AT_RULE_RE.replace_all(&css, "");
    if css.len() != raw.len() {
        debug!("sanitizer removed {} bytes of css", raw.len() - css.len());
    }
    css.into_owned()
}

/// Strip script-execution vectors from an HTML fragment, preserving
/// benign markup.
pub fn sanitize_html(raw: &str) -> String {
    let html = HTML_SCRIPT_BLOCK_RE.replace_all(raw, "");
    let html = HTML_EMBED_BLOCK_RE.replace_all(&html, "");
    let html = HTML_ORPHAN_TAG_RE.replace_all(&html, "");
    let html = HTML_EVENT_ATTR_RE.replace_all(&html, "");
    let html = HTML_SCRIPT_URL_ATTR_RE.replace_all(&html, "");
    if html.len() != raw.len() {
        debug!("sanitizer removed {} bytes of html", raw.len() - html.len());
    }
    html.into_owned()
}

// =============================================================================
// ESCAPING HELPERS
// =============================================================================

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text for interpolation into a quoted CSS string literal.
pub fn escape_css_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\'")
}
