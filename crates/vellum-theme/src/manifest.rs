//! Canonical package pipeline: `theme.json` validation and assembly.
//!
//! This is the first-party format and the one place where the pipeline is
//! strict: any schema violation fails the upload with a field-qualified
//! error list, and a presets file is validated atomically — one bad entry
//! rejects them all. Optional pieces (template, fonts, thumbnail) stay
//! best-effort.

use crate::archive::{parent_dir, resolve_path, ThemeArchive};
use crate::assets::{read_font_asset, read_thumbnail};
use crate::presets::validate_preset;
use crate::sanitize::{sanitize_css, sanitize_html};
use crate::types::{ParsedTheme, ThemeAsset, ThemePreset, ThemeType};
use serde_json::Value;
use tracing::{info, warn};
use vellum_common::ThemeUploadError;

/// Supported manifest schema version.
const MANIFEST_VERSION: i64 = 1;

/// A validated `theme.json`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CanonicalManifest {
    pub name: String,
    pub theme_type: ThemeType,
    pub css: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub template: Option<String>,
    pub presets: Option<String>,
    pub fonts: Vec<FontDecl>,
    pub thumbnail: Option<String>,
}

/// One declared font: display name plus archive-relative path.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FontDecl {
    pub name: String,
    pub path: String,
}

fn required_string(doc: &Value, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match doc.get(key) {
        None => {
            errors.push(format!("{key}: is required"));
            None
        }
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(_) => {
            errors.push(format!("{key}: must be a non-empty string"));
            None
        }
    }
}

fn optional_string(doc: &Value, key: &str, errors: &mut Vec<String>) -> Option<String> {
    match doc.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(format!("{key}: must be a string"));
            None
        }
    }
}

/// Validate a parsed `theme.json` document against the fixed schema.
///
/// Collects one `"<field.path>: <description>"` message per violation and
/// returns the typed manifest only when the document is fully valid.
pub(crate) fn validate_manifest(doc: &Value) -> Result<CanonicalManifest, Vec<String>> {
    let mut errors = Vec::new();

    if !doc.is_object() {
        return Err(vec!["manifest: must be a JSON object".to_string()]);
    }

    match doc.get("version") {
        Some(v) if v.as_i64() == Some(MANIFEST_VERSION) => {}
        _ => errors.push(format!("version: must equal {MANIFEST_VERSION}")),
    }

    let name = required_string(doc, "name", &mut errors);

    let theme_type = match doc.get("type").and_then(Value::as_str) {
        Some("preview") => Some(ThemeType::Preview),
        Some("slideshow") => Some(ThemeType::Slideshow),
        _ => {
            errors.push("type: must be one of preview, slideshow".to_string());
            None
        }
    };

    let css = required_string(doc, "css", &mut errors);
    let author = optional_string(doc, "author", &mut errors);
    let description = optional_string(doc, "description", &mut errors);
    let template = optional_string(doc, "template", &mut errors);
    let presets = optional_string(doc, "presets", &mut errors);
    let thumbnail = optional_string(doc, "thumbnail", &mut errors);

    let mut fonts = Vec::new();
    match doc.get("fonts") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                if !item.is_object() {
                    errors.push(format!("fonts[{i}]: must be an object"));
                    continue;
                }
                let font_name = match item.get("name").and_then(Value::as_str) {
                    Some(s) if !s.trim().is_empty() => Some(s.to_string()),
                    _ => {
                        errors.push(format!("fonts[{i}].name: must be a non-empty string"));
                        None
                    }
                };
                let font_path = match item.get("path").and_then(Value::as_str) {
                    Some(s) if !s.trim().is_empty() => Some(s.to_string()),
                    _ => {
                        errors.push(format!("fonts[{i}].path: must be a non-empty string"));
                        None
                    }
                };
                if let (Some(name), Some(path)) = (font_name, font_path) {
                    fonts.push(FontDecl { name, path });
                }
            }
        }
        Some(_) => errors.push("fonts: must be an array".to_string()),
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CanonicalManifest {
        name: name.unwrap_or_default(),
        theme_type: theme_type.unwrap_or(ThemeType::Preview),
        css: css.unwrap_or_default(),
        author,
        description,
        template,
        presets,
        fonts,
        thumbnail,
    })
}

/// Resolve the presets file atomically: every entry must validate.
async fn resolve_presets(
    archive: &dyn ThemeArchive,
    path: &str,
) -> Result<Vec<ThemePreset>, ThemeUploadError> {
    let text = archive.read_text(path).await.map_err(|_| {
        ThemeUploadError::InvalidPresets {
            errors: vec![format!("presets: file not found: {path}")],
        }
    })?;

    let doc: Value = serde_json::from_str(&text).map_err(|e| ThemeUploadError::InvalidPresets {
        errors: vec![format!("presets: invalid JSON: {e}")],
    })?;

    // A bare array, or an object wrapping one under `presets`.
    let entries = match &doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("presets") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => {
                return Err(ThemeUploadError::InvalidPresets {
                    errors: vec!["presets: must be an array".to_string()],
                })
            }
        },
        _ => {
            return Err(ThemeUploadError::InvalidPresets {
                errors: vec!["presets: must be an array".to_string()],
            })
        }
    };

    let mut errors = Vec::new();
    let mut presets = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if let Some(preset) = validate_preset(i, entry, &mut errors) {
            presets.push(preset);
        }
    }

    if !errors.is_empty() {
        return Err(ThemeUploadError::InvalidPresets { errors });
    }
    Ok(presets)
}

/// Parse a canonical package anchored at `manifest_path`.
pub(crate) async fn parse_canonical(
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

    let manifest =
        validate_manifest(&doc).map_err(|errors| ThemeUploadError::InvalidManifest { errors })?;

    // Required stylesheet
    let css_path = resolve_path(base_dir, &manifest.css);
    if !archive.contains_file(&css_path) {
        return Err(ThemeUploadError::MissingCss);
    }
    let raw_css = archive
        .read_text(&css_path)
        .await
        .map_err(|_| ThemeUploadError::MissingCss)?;
    let css = sanitize_css(&raw_css);
    if css.trim().is_empty() {
        return Err(ThemeUploadError::MissingCss);
    }

    // Optional template, best-effort
    let template = match &manifest.template {
        Some(rel) => {
            let path = resolve_path(base_dir, rel);
            match archive.read_text(&path).await {
                Ok(html) => Some(sanitize_html(&html)),
                Err(e) => {
                    warn!("skipping template {path}: {e}");
                    None
                }
            }
        }
        None => None,
    };

    // Presets, strict and atomic
    let presets = match &manifest.presets {
        Some(rel) => {
            let path = resolve_path(base_dir, rel);
            resolve_presets(archive, &path).await?
        }
        None => Vec::new(),
    };

    // Declared fonts, best-effort
    let mut assets: Vec<ThemeAsset> = Vec::new();
    for decl in &manifest.fonts {
        let path = resolve_path(base_dir, &decl.path);
        if let Some(asset) = read_font_asset(archive, &path, &decl.name).await {
            assets.push(asset);
        }
    }

    // Thumbnail, best-effort
    let thumbnail = match &manifest.thumbnail {
        Some(rel) => read_thumbnail(archive, &resolve_path(base_dir, rel)).await,
        None => None,
    };

    info!(
        "parsed canonical theme '{}' ({} presets, {} fonts)",
        manifest.name,
        presets.len(),
        assets.len()
    );

    Ok(ParsedTheme {
        name: manifest.name,
        author: manifest.author,
        description: manifest.description,
        theme_type: manifest.theme_type,
        css,
        template,
        presets,
        assets,
        thumbnail,
    })
}
