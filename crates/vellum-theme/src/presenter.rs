//! Foreign presenter bundle pipeline, anchored at `template.json`.
//!
//! Presenter bundles are externally authored and loosely specified, so
//! everything past the manifest is tolerant: the stylesheet is probed
//! from a candidate list, and a malformed presets payload produces zero
//! presets instead of an error. Only the manifest itself and a missing
//! stylesheet can fail the upload.

use crate::archive::{parent_dir, resolve_path, ThemeArchive};
use crate::assets::{collect_font_assets, find_thumbnail};
use crate::presets::convert_foreign_preset;
use crate::sanitize::sanitize_css;
use crate::types::{ParsedTheme, ThemePreset, ThemeType};
use serde_json::Value;
use tracing::{info, warn};
use vellum_common::ThemeUploadError;

/// Stylesheet names probed after the manifest's declared one.
const CSS_CANDIDATES: &[&str] = &["styles.css", "theme.css", "style.css"];
/// Thumbnail names probed in order.
const THUMBNAIL_CANDIDATES: &[&str] =
    &["thumbnail.png", "thumbnail.jpg", "preview.png", "preview.jpg"];
/// Default presets filename when the manifest declares none.
const DEFAULT_PRESETS_FILE: &str = "presets.json";

/// The minimal manifest shape of a presenter bundle.
#[derive(Debug, Clone, PartialEq)]
struct PresenterManifest {
    name: String,
    author: Option<String>,
    description: Option<String>,
    css: Option<String>,
    presets: Option<String>,
}

fn validate_presenter_manifest(doc: &Value) -> Result<PresenterManifest, Vec<String>> {
    let mut errors = Vec::new();

    if !doc.is_object() {
        return Err(vec!["manifest: must be a JSON object".to_string()]);
    }

    let name = match doc.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(_) => {
            errors.push("name: must be a non-empty string".to_string());
            None
        }
        None => {
            errors.push("name: is required".to_string());
            None
        }
    };

    let mut optional = |key: &str| match doc.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("{key}: must be a string"));
            None
        }
    };
    let author = optional("author");
    let description = optional("description");
    let css = optional("css");
    let presets = optional("presets");

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(PresenterManifest {
        name: name.unwrap_or_default(),
        author,
        description,
        css,
        presets,
    })
}

/// Probe the stylesheet candidates in order; the first file that exists
/// under the base path wins. No import following here, single file only.
async fn resolve_css(
    archive: &dyn ThemeArchive,
    base_dir: &str,
    declared: Option<&str>,
) -> Result<String, ThemeUploadError> {
    let mut candidates: Vec<&str> = Vec::new();
    if let Some(name) = declared {
        candidates.push(name);
    }
    candidates.extend_from_slice(CSS_CANDIDATES);

    for candidate in candidates {
        let path = resolve_path(base_dir, candidate);
        if !archive.contains_file(&path) {
            continue;
        }
        let raw = archive
            .read_text(&path)
            .await
            .map_err(|_| ThemeUploadError::MissingCss)?;
        let css = sanitize_css(&raw);
        if css.trim().is_empty() {
            return Err(ThemeUploadError::MissingCss);
        }
        return Ok(css);
    }
    Err(ThemeUploadError::MissingCss)
}

/// Best-effort preset extraction. Any parse or shape failure yields zero
/// presets; entries the heuristic converter rejects are dropped.
async fn resolve_presets(
    archive: &dyn ThemeArchive,
    base_dir: &str,
    declared: Option<&str>,
) -> Vec<ThemePreset> {
    let path = resolve_path(base_dir, declared.unwrap_or(DEFAULT_PRESETS_FILE));
    if !archive.contains_file(&path) {
        return Vec::new();
    }

    let text = match archive.read_text(&path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("unreadable presets file {path}: {e}");
            return Vec::new();
        }
    };

    let doc: Value = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("ignoring malformed presets file {path}: {e}");
            return Vec::new();
        }
    };

    // An array, or an array wrapped under a known field.
    let entries = match &doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match ["presets", "colors", "themes"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
        {
            Some(items) => items.as_slice(),
            None => {
                warn!("presets file {path} has no recognizable preset array");
                return Vec::new();
            }
        },
        _ => {
            warn!("presets file {path} is not an array");
            return Vec::new();
        }
    };

    let mut presets = Vec::new();
    for entry in entries {
        match convert_foreign_preset(entry) {
            Some(preset) => presets.push(preset),
            None => warn!("dropping foreign preset without resolvable colors"),
        }
    }
    presets
}

/// Parse a presenter bundle anchored at `manifest_path`.
pub(crate) async fn parse_presenter(
    archive: &dyn ThemeArchive,
    manifest_path: &str,
) -> Result<ParsedTheme, ThemeUploadError> {
    let base_dir = parent_dir(manifest_path);

    let text = archive
        .read_text(manifest_path)
        .await
        .map_err(|_| ThemeUploadError::MissingManifest)?;

    let doc: Value = serde_json::from_str(&text).map_err(|e| ThemeUploadError::InvalidManifest {
        errors: vec![format!("manifest: invalid JSON: {e}")],
    })?;

    let manifest = validate_presenter_manifest(&doc)
        .map_err(|errors| ThemeUploadError::InvalidManifest { errors })?;

    let css = resolve_css(archive, base_dir, manifest.css.as_deref()).await?;
    let presets = resolve_presets(archive, base_dir, manifest.presets.as_deref()).await;
    let assets = collect_font_assets(archive, base_dir).await;
    let thumbnail = find_thumbnail(archive, base_dir, THUMBNAIL_CANDIDATES).await;

    info!(
        "parsed presenter bundle '{}' ({} presets, {} fonts)",
        manifest.name,
        presets.len(),
        assets.len()
    );

    Ok(ParsedTheme {
        name: manifest.name,
        author: manifest.author,
        description: manifest.description,
        theme_type: ThemeType::Slideshow,
        css,
        template: None,
        presets,
        assets,
        thumbnail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::archive_of;
    use crate::types::Appearance;
    use serde_json::json;

    #[tokio::test]
    async fn parses_minimal_bundle() {
        let archive = archive_of(&[
            ("template.json", br#"{ "name": "Y" }"# as &[u8]),
            ("styles.css", b".slide {}"),
        ]);
        let theme = parse_presenter(&archive, "template.json").await.unwrap();
        assert_eq!(theme.name, "Y");
        assert_eq!(theme.theme_type, ThemeType::Slideshow);
        assert_eq!(theme.css, ".slide {}");
        assert!(theme.presets.is_empty());
    }

    #[tokio::test]
    async fn declared_css_beats_candidates() {
        let archive = archive_of(&[
            (
                "template.json",
                br#"{ "name": "Y", "css": "custom.css" }"# as &[u8],
            ),
            ("custom.css", b".custom {}"),
            ("styles.css", b".fallback {}"),
        ]);
        let theme = parse_presenter(&archive, "template.json").await.unwrap();
        assert_eq!(theme.css, ".custom {}");
    }

    #[tokio::test]
    async fn css_candidates_probed_in_order() {
        let archive = archive_of(&[
            ("template.json", br#"{ "name": "Y" }"# as &[u8]),
            ("style.css", b".third {}"),
            ("theme.css", b".second {}"),
        ]);
        let theme = parse_presenter(&archive, "template.json").await.unwrap();
        assert_eq!(theme.css, ".second {}");
    }

    #[tokio::test]
    async fn no_stylesheet_is_fatal() {
        let archive = archive_of(&[("template.json", br#"{ "name": "Y" }"# as &[u8])]);
        let err = parse_presenter(&archive, "template.json").await.unwrap_err();
        assert_eq!(err, ThemeUploadError::MissingCss);
    }

    #[tokio::test]
    async fn missing_name_is_invalid_manifest() {
        let archive = archive_of(&[
            ("template.json", br#"{ "author": "A" }"# as &[u8]),
            ("styles.css", b".x {}"),
        ]);
        let err = parse_presenter(&archive, "template.json").await.unwrap_err();
        match err {
            ThemeUploadError::InvalidManifest { errors } => {
                assert_eq!(errors, vec!["name: is required"]);
            }
            other => panic!("expected InvalidManifest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unresolvable_presets_are_dropped_silently() {
        let presets = json!([
            { "name": "A", "background": "#111", "foreground": "#eee" },
            { "name": "B", "colors": { "bg": "#fff", "text": "#000" } },
            { "name": "C", "foreground": "#123" }
        ]);
        let archive = archive_of(&[
            ("template.json", br#"{ "name": "Y" }"# as &[u8]),
            ("styles.css", b".x {}"),
            ("presets.json", serde_json::to_vec(&presets).unwrap().as_slice()),
        ]);
        let theme = parse_presenter(&archive, "template.json").await.unwrap();
        assert_eq!(theme.presets.len(), 2);
        assert_eq!(theme.presets[0].name, "A");
        assert_eq!(theme.presets[0].appearance, Appearance::Dark);
        assert_eq!(theme.presets[1].name, "B");
    }

    #[tokio::test]
    async fn malformed_presets_payload_yields_zero() {
        let archive = archive_of(&[
            ("template.json", br#"{ "name": "Y" }"# as &[u8]),
            ("styles.css", b".x {}"),
            ("presets.json", b"not json at all"),
        ]);
        let theme = parse_presenter(&archive, "template.json").await.unwrap();
        assert!(theme.presets.is_empty());
    }

    #[tokio::test]
    async fn presets_extracted_from_wrapping_fields() {
        let presets = json!({ "themes": [
            { "name": "T", "background": "#fff", "foreground": "#000" }
        ]});
        let archive = archive_of(&[
            ("template.json", br#"{ "name": "Y" }"# as &[u8]),
            ("styles.css", b".x {}"),
            ("presets.json", serde_json::to_vec(&presets).unwrap().as_slice()),
        ]);
        let theme = parse_presenter(&archive, "template.json").await.unwrap();
        assert_eq!(theme.presets.len(), 1);
        assert_eq!(theme.presets[0].name, "T");
    }

    #[tokio::test]
    async fn declared_presets_filename_is_used() {
        let presets = json!([{ "name": "P", "background": "#000", "foreground": "#fff" }]);
        let archive = archive_of(&[
            (
                "template.json",
                br#"{ "name": "Y", "presets": "schemes.json" }"# as &[u8],
            ),
            ("styles.css", b".x {}"),
            ("schemes.json", serde_json::to_vec(&presets).unwrap().as_slice()),
        ]);
        let theme = parse_presenter(&archive, "template.json").await.unwrap();
        assert_eq!(theme.presets.len(), 1);
    }

    #[tokio::test]
    async fn thumbnail_and_fonts_collected() {
        let archive = archive_of(&[
            ("pack/template.json", br#"{ "name": "Y" }"# as &[u8]),
            ("pack/styles.css", b".x {}"),
            ("pack/preview.png", b"imgdata"),
            ("pack/fonts/slide.woff", b"\x01"),
        ]);
        let theme = parse_presenter(&archive, "pack/template.json").await.unwrap();
        let thumb = theme.thumbnail.unwrap();
        assert_eq!(thumb.name, "preview.png");
        assert_eq!(thumb.mime_type, "image/png");
        assert_eq!(theme.assets.len(), 1);
        assert_eq!(theme.assets[0].mime_type, "font/woff");
    }
}
