//! Archive capability contract consumed by the pipeline, plus the
//! zip-backed default implementation.
//!
//! The pipeline never touches a zip library directly. It needs four
//! operations: an entry listing, a file-existence test, and text/binary
//! reads. Anything satisfying [`ThemeArchive`] works; [`ZipArchiveIndex`]
//! decodes an uploaded zip into an in-memory entry map so the parsed theme
//! owns no reference back into the source bytes.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use tracing::warn;
use vellum_common::ThemeUploadError;

/// One `(path, is_dir)` pair from the archive listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveReadError {
    #[error("archive entry not found: {0}")]
    NotFound(String),
}

/// Narrow contract over an opened archive index.
#[async_trait]
pub trait ThemeArchive: Send + Sync {
    /// True when `path` names a file entry (directories excluded).
    fn contains_file(&self, path: &str) -> bool;

    /// All entries in archive order.
    fn entries(&self) -> Vec<ArchiveEntry>;

    /// Read an entry as text (lossy UTF-8).
    async fn read_text(&self, path: &str) -> Result<String, ArchiveReadError>;

    /// Read an entry as a binary blob.
    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ArchiveReadError>;
}

/// In-memory index over an uploaded zip archive.
///
/// Every entry is copied out at open time. Entries whose names escape the
/// archive root (zip-slip) are skipped.
#[derive(Debug)]
pub struct ZipArchiveIndex {
    files: BTreeMap<String, Vec<u8>>,
    order: Vec<ArchiveEntry>,
}

impl ZipArchiveIndex {
    /// Decode raw upload bytes into an entry index.
    ///
    /// Any structural failure in the zip maps to
    /// [`ThemeUploadError::InvalidZip`].
    pub fn open(bytes: &[u8]) -> Result<Self, ThemeUploadError> {
        let cursor = Cursor::new(bytes.to_vec());
        let mut zip = zip::ZipArchive::new(cursor).map_err(|e| {
            warn!("rejected upload, unreadable zip: {e}");
            ThemeUploadError::InvalidZip
        })?;

        let mut files = BTreeMap::new();
        let mut order = Vec::new();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).map_err(|e| {
                warn!("rejected upload, corrupt zip entry {i}: {e}");
                ThemeUploadError::InvalidZip
            })?;

            if entry.enclosed_name().is_none() {
                warn!("skipping zip entry with unsafe path: {}", entry.name());
                continue;
            }

            let path = entry.name().trim_end_matches('/').to_string();
            if path.is_empty() {
                continue;
            }

            if entry.is_dir() {
                order.push(ArchiveEntry { path, is_dir: true });
                continue;
            }

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data).map_err(|e| {
                warn!("rejected upload, unreadable zip entry {path}: {e}");
                ThemeUploadError::InvalidZip
            })?;
            order.push(ArchiveEntry {
                path: path.clone(),
                is_dir: false,
            });
            files.insert(path, data);
        }

        Ok(Self { files, order })
    }
}

#[async_trait]
impl ThemeArchive for ZipArchiveIndex {
    fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn entries(&self) -> Vec<ArchiveEntry> {
        self.order.clone()
    }

    async fn read_text(&self, path: &str) -> Result<String, ArchiveReadError> {
        let data = self
            .files
            .get(path)
            .ok_or_else(|| ArchiveReadError::NotFound(path.to_string()))?;
        Ok(String::from_utf8_lossy(data).into_owned())
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ArchiveReadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ArchiveReadError::NotFound(path.to_string()))
    }
}

/// Resolve `rel` against a base directory, normalizing `.` and `..`
/// segments. `base_dir` may be `""` (archive root) and may or may not end
/// with a slash.
pub(crate) fn resolve_path(base_dir: &str, rel: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in rel.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Directory prefix of `path`, including the trailing slash; `""` for a
/// root-level path.
pub(crate) fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

/// Final path segment.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::ZipArchiveIndex;
    use std::io::{Cursor, Write};

    /// Build an in-memory zip index from `(path, content)` pairs.
    pub(crate) fn archive_of(entries: &[(&str, &[u8])]) -> ZipArchiveIndex {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (path, data) in entries {
            writer.start_file(*path, options).unwrap();
            writer.write_all(data).unwrap();
        }
        let cursor = writer.finish().unwrap();
        ZipArchiveIndex::open(&cursor.into_inner()).unwrap()
    }
}
