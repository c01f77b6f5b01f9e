//! Error types for the layout and compositing engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rendering a scene
#[derive(Error, Debug)]
pub enum Error {
    /// A raster surface could not be allocated. Fatal for the current render pass.
    #[error("Surface allocation failed: {0}")]
    SurfaceError(String),

    /// A font could not be parsed, or no font is available for a spec
    #[error("Font error: {0}")]
    FontError(String),

    /// An encoded image could not be decoded
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// PNG encoding failed
    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    /// The wait was superseded by a newer render request
    #[error("Superseded by a newer request")]
    Canceled,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// I/O error from the platform layer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Cancellation is an expected outcome, not a failure to report.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }
}

impl From<png::DecodingError> for Error {
    fn from(err: png::DecodingError) -> Self {
        Error::DecodeError(err.to_string())
    }
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::EncodeError(err.to_string())
    }
}
