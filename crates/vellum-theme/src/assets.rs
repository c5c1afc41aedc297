//! Binary asset extraction: fonts and thumbnails, with MIME inference.
//!
//! MIME types are always derived from the file extension. Asset reads are
//! best-effort: a missing or unreadable file is logged and skipped, never
//! failing the upload.

use crate::archive::{file_name, resolve_path, ThemeArchive};
use crate::types::ThemeAsset;
use tracing::warn;

const FONT_EXTENSIONS: &[&str] = &["woff2", "woff", "ttf", "otf"];

/// Lowercased extension of a path, if any.
fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub(crate) fn is_font_file(path: &str) -> bool {
    extension(path).is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type of a font file by extension. Unknown extensions fall back to
/// `font/woff2`.
pub(crate) fn font_mime(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("woff") => "font/woff",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        _ => "font/woff2",
    }
}

/// MIME type of an image file by extension. Unknown extensions fall back
/// to `image/png`.
pub(crate) fn image_mime(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

/// Read one declared font file. `None` on any read failure.
pub(crate) async fn read_font_asset(
    archive: &dyn ThemeArchive,
    path: &str,
    name: &str,
) -> Option<ThemeAsset> {
    match archive.read_bytes(path).await {
        Ok(data) => Some(ThemeAsset {
            name: name.to_string(),
            mime_type: font_mime(path).to_string(),
            data,
        }),
        Err(e) => {
            warn!("skipping font {name}: {e}");
            None
        }
    }
}

/// Collect every font file under `dir_prefix` as an asset, in archive
/// order. Non-font files at the same paths are ignored.
pub(crate) async fn collect_font_assets(
    archive: &dyn ThemeArchive,
    dir_prefix: &str,
) -> Vec<ThemeAsset> {
    let mut assets = Vec::new();
    for entry in archive.entries() {
        if entry.is_dir || !entry.path.starts_with(dir_prefix) || !is_font_file(&entry.path) {
            continue;
        }
        let name = file_name(&entry.path).to_string();
        if let Some(asset) = read_font_asset(archive, &entry.path, &name).await {
            assets.push(asset);
        }
    }
    assets
}

/// Probe thumbnail candidates under `base_dir` in order; first one that
/// exists and reads wins.
pub(crate) async fn find_thumbnail(
    archive: &dyn ThemeArchive,
    base_dir: &str,
    candidates: &[&str],
) -> Option<ThemeAsset> {
    for candidate in candidates {
        let path = resolve_path(base_dir, candidate);
        if !archive.contains_file(&path) {
            continue;
        }
        match archive.read_bytes(&path).await {
            Ok(data) => {
                return Some(ThemeAsset {
                    name: file_name(&path).to_string(),
                    mime_type: image_mime(&path).to_string(),
                    data,
                });
            }
            Err(e) => warn!("skipping thumbnail {path}: {e}"),
        }
    }
    None
}

/// Read one declared thumbnail path, best-effort.
pub(crate) async fn read_thumbnail(archive: &dyn ThemeArchive, path: &str) -> Option<ThemeAsset> {
    match archive.read_bytes(path).await {
        Ok(data) => Some(ThemeAsset {
            name: file_name(path).to_string(),
            mime_type: image_mime(path).to_string(),
            data,
        }),
        Err(e) => {
            warn!("skipping thumbnail {path}: {e}");
            None
        }
    }
}
