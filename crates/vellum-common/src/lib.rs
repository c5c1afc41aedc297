pub mod errors;
pub mod types;

pub use errors::{ThemeUploadError, VellumError};
pub use types::Color;

pub type Result<T> = std::result::Result<T, VellumError>;
