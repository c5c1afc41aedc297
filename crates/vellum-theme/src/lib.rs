//! Vellum theme ingestion.
//!
//! Converts an uploaded zip archive describing a visual theme into a
//! single canonical, sanitized [`ParsedTheme`] record. Three package
//! layouts are accepted: the canonical `theme.json` format (strict),
//! legacy template bundles, and foreign presenter bundles (both
//! best-effort). All HTML/CSS content is sanitized before it leaves this
//! crate; the result owns no reference back into the source archive.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # async fn upload(bytes: Vec<u8>) {
//! use vellum_theme::parse_theme_archive;
//!
//! match parse_theme_archive(&bytes).await {
//!     Ok(theme) => println!("imported theme '{}'", theme.name),
//!     Err(e) => eprintln!("upload rejected: {e}"),
//! }
//! # }
//! ```

pub mod archive;
pub mod assets;
pub mod colors;
pub mod css;
pub mod detect;
pub mod legacy;
pub mod manifest;
pub mod presenter;
pub mod presets;
pub mod sanitize;
pub mod types;

pub use archive::{ArchiveEntry, ArchiveReadError, ThemeArchive, ZipArchiveIndex};
pub use colors::classify;
pub use detect::{detect_format, DetectedFormat};
pub use sanitize::{sanitize_css, sanitize_html};
pub use types::{
    Appearance, ParsedTheme, PresetColors, PresetFonts, ThemeAsset, ThemePreset, ThemeType,
};
pub use vellum_common::ThemeUploadError;

use tracing::info;

/// Parse an uploaded theme archive from its raw bytes.
///
/// Opens the bytes as a zip, detects the package format, and runs the
/// matching pipeline. Returns the parsed theme or exactly one
/// [`ThemeUploadError`].
pub async fn parse_theme_archive(bytes: &[u8]) -> Result<ParsedTheme, ThemeUploadError> {
    let archive = ZipArchiveIndex::open(bytes)?;
    parse_theme(&archive).await
}

/// Parse a theme from an already-opened archive index.
pub async fn parse_theme(archive: &dyn ThemeArchive) -> Result<ParsedTheme, ThemeUploadError> {
    match detect_format(archive) {
        Some(DetectedFormat::Legacy { plist_path }) => {
            info!("detected legacy template bundle at {plist_path}");
            legacy::parse_legacy(archive, &plist_path).await
        }
        Some(DetectedFormat::Presenter { manifest_path }) => {
            info!("detected presenter bundle at {manifest_path}");
            presenter::parse_presenter(archive, &manifest_path).await
        }
        Some(DetectedFormat::Canonical { manifest_path }) => {
            info!("detected canonical package at {manifest_path}");
            manifest::parse_canonical(archive, &manifest_path).await
        }
        None => Err(ThemeUploadError::MissingManifest),
    }
}
