/// Terminal error of the theme upload pipeline.
///
/// A pipeline run produces either a parsed theme or exactly one of these.
/// `InvalidManifest` and `InvalidPresets` carry the full field-qualified
/// message list so the UI can show every violation at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeUploadError {
    #[error("archive is not a readable zip file")]
    InvalidZip,

    #[error("no theme manifest found in archive")]
    MissingManifest,

    #[error("theme manifest is invalid: {}", errors.join("; "))]
    InvalidManifest { errors: Vec<String> },

    #[error("theme stylesheet is missing or empty")]
    MissingCss,

    #[error("theme presets are invalid: {}", errors.join("; "))]
    InvalidPresets { errors: Vec<String> },

    #[error("file referenced by manifest not found: {path}")]
    MissingFile { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum VellumError {
    #[error(transparent)]
    Theme(#[from] ThemeUploadError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
