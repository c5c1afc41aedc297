//! Legacy template bundle pipeline, anchored at `Contents/Info.plist`.
//!
//! These bundles ship an HTML template plus stylesheets under
//! `Contents/Resources/`. The plist is only ever needed as a flat
//! key/string dictionary, so a purpose-built extractor is used instead of
//! a property-list library; arrays and nested dicts are silently ignored.

use crate::archive::{resolve_path, ThemeArchive};
use crate::assets::collect_font_assets;
use crate::css::{inline_stylesheet, stylesheet_hrefs};
use crate::sanitize::{sanitize_css, sanitize_html};
use crate::types::{ParsedTheme, ThemeType};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::info;
use vellum_common::ThemeUploadError;

/// Bundle display name.
const KEY_BUNDLE_NAME: &str = "CFBundleName";
/// Template base filename, without extension.
const KEY_TEMPLATE_FILE: &str = "IATemplateDocumentFile";

static PLIST_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<key>\s*([^<]+?)\s*</key>\s*<string>([^<]*)</string>").unwrap()
});

/// Extract the flat `<key>…</key><string>…</string>` pairs of a plist.
pub(crate) fn plist_string_pairs(plist: &str) -> HashMap<String, String> {
    PLIST_PAIR_RE
        .captures_iter(plist)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

/// Parse a legacy bundle anchored at `plist_path`.
pub(crate) async fn parse_legacy(
    archive: &dyn ThemeArchive,
    plist_path: &str,
) -> Result<ParsedTheme, ThemeUploadError> {
    let bundle_dir = plist_path
        .strip_suffix("Contents/Info.plist")
        .unwrap_or_default();
    let resources_dir = format!("{bundle_dir}Contents/Resources/");

    let plist = archive
        .read_text(plist_path)
        .await
        .map_err(|_| ThemeUploadError::MissingManifest)?;
    let pairs = plist_string_pairs(&plist);

    let mut errors = Vec::new();
    if !pairs.contains_key(KEY_BUNDLE_NAME) {
        errors.push(format!("{KEY_BUNDLE_NAME}: is required"));
    }
    if !pairs.contains_key(KEY_TEMPLATE_FILE) {
        errors.push(format!("{KEY_TEMPLATE_FILE}: is required"));
    }
    if !errors.is_empty() {
        return Err(ThemeUploadError::InvalidManifest { errors });
    }
    let name = pairs[KEY_BUNDLE_NAME].clone();
    let template_base = &pairs[KEY_TEMPLATE_FILE];

    let template_path = resolve_path(&resources_dir, &format!("{template_base}.html"));
    let html = archive.read_text(&template_path).await.map_err(|_| {
        ThemeUploadError::MissingFile {
            path: template_path.clone(),
        }
    })?;

    // Inline every linked stylesheet and its imports, then try style.css
    // as a fallback if the links did not already pull it in.
    let mut visited = HashSet::new();
    let mut combined = String::new();
    for href in stylesheet_hrefs(&html) {
        inline_stylesheet(archive, &resources_dir, href, &mut visited, &mut combined).await;
    }
    inline_stylesheet(
        archive,
        &resources_dir,
        "style.css".to_string(),
        &mut visited,
        &mut combined,
    )
    .await;

    if combined.trim().is_empty() {
        return Err(ThemeUploadError::MissingCss);
    }
    let css = sanitize_css(&combined);
    if css.trim().is_empty() {
        return Err(ThemeUploadError::MissingCss);
    }

    let template = sanitize_html(&html);
    let assets = collect_font_assets(archive, &resources_dir).await;

    info!(
        "parsed legacy bundle '{name}' ({} stylesheets, {} fonts)",
        visited.len(),
        assets.len()
    );

    Ok(ParsedTheme {
        name,
        author: None,
        description: None,
        theme_type: ThemeType::Preview,
        css,
        template: Some(template),
        presets: Vec::new(),
        assets,
        thumbnail: None,
    })
}
