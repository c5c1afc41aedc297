//! Archive format detection.
//!
//! Three package layouts are accepted. Detection is an ordered list of
//! independent strategies; the order is significant and must not change:
//! legacy template bundles (anchored at `Contents/Info.plist`) win over
//! foreign presenter bundles (`template.json`, mutually exclusive with
//! `theme.json`), which win over canonical packages (`theme.json`).

use crate::archive::{file_name, ThemeArchive};

/// A recognized package layout, anchored at its manifest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedFormat {
    /// Legacy template bundle, anchored at its `Info.plist`.
    Legacy { plist_path: String },
    /// Foreign presenter bundle, anchored at its `template.json`.
    Presenter { manifest_path: String },
    /// Canonical package, anchored at its `theme.json`.
    Canonical { manifest_path: String },
}

/// Classify the archive, or `None` when no manifest of any recognized
/// format is present.
pub fn detect_format(archive: &dyn ThemeArchive) -> Option<DetectedFormat> {
    detect_legacy(archive)
        .or_else(|| detect_presenter(archive))
        .or_else(|| detect_canonical(archive))
}

/// A `Contents/Info.plist` at the archive root or nested inside exactly
/// one bundle directory.
fn detect_legacy(archive: &dyn ThemeArchive) -> Option<DetectedFormat> {
    for entry in archive.entries() {
        if entry.is_dir {
            continue;
        }
        let segments: Vec<&str> = entry.path.split('/').collect();
        let nested_once = segments.len() == 3 || segments.len() == 2;
        if nested_once && segments.ends_with(&["Contents", "Info.plist"]) {
            return Some(DetectedFormat::Legacy {
                plist_path: entry.path,
            });
        }
    }
    None
}

/// A near-top-level `template.json`, provided no `theme.json` exists
/// anywhere in the archive (the canonical format also ships one and would
/// be ambiguous otherwise).
fn detect_presenter(archive: &dyn ThemeArchive) -> Option<DetectedFormat> {
    let manifest_path = find_near_root(archive, "template.json")?;
    let has_theme_json = archive
        .entries()
        .iter()
        .any(|e| !e.is_dir && file_name(&e.path) == "theme.json");
    if has_theme_json {
        return None;
    }
    Some(DetectedFormat::Presenter { manifest_path })
}

/// A `theme.json` at the root or inside one wrapping folder.
fn detect_canonical(archive: &dyn ThemeArchive) -> Option<DetectedFormat> {
    let manifest_path = find_near_root(archive, "theme.json")?;
    Some(DetectedFormat::Canonical { manifest_path })
}

/// Find `name` at the archive root, or inside exactly one top-level
/// directory (zips often wrap their payload in a single folder).
fn find_near_root(archive: &dyn ThemeArchive, name: &str) -> Option<String> {
    if archive.contains_file(name) {
        return Some(name.to_string());
    }
    archive
        .entries()
        .into_iter()
        .filter(|e| !e.is_dir)
        .find(|e| {
            let segments: Vec<&str> = e.path.split('/').collect();
            segments.len() == 2 && segments[1] == name
        })
        .map(|e| e.path)
}
