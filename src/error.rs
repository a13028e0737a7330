//! Error types for the lettering compositor

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for callers that map failures to
/// responses (e.g. 4xx vs 5xx) without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is unacceptable (too long, empty)
    Validation,
    /// A character has no glyph in the catalog
    MissingAsset,
    /// The catalog could not be read or a glyph could not be decoded
    Io,
    /// Canvas allocation, encoding or configuration failure
    Internal,
}

/// Errors that can occur while rendering a letter
///
/// Every error aborts the whole render; no partial image is ever produced.
#[derive(Error, Debug)]
pub enum Error {
    /// The wrapped prompt has more lines than allowed
    #[error("Too long text: prompt wraps to {lines} lines (max {max})")]
    PromptTooLong { lines: usize, max: usize },

    /// Nothing left to draw after sanitizing the prompt
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// The request could not be parsed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No catalog directory, or no matching image files, for a character
    #[error("No images for '{ch}' with char code '{code}' were found")]
    MissingAsset { ch: char, code: u32 },

    /// The catalog exists but could not be read
    #[error("Failed to read glyph catalog at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A selected glyph file is not a usable image
    #[error("Failed to decode glyph image {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    /// Failed to allocate, composite or encode the canvas
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl Error {
    pub fn missing_asset(ch: char) -> Self {
        Error::MissingAsset { ch, code: ch as u32 }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PromptTooLong { .. } | Error::EmptyPrompt | Error::InvalidRequest(_) => {
                ErrorKind::Validation
            }
            Error::MissingAsset { .. } => ErrorKind::MissingAsset,
            Error::Io { .. } | Error::Decode { .. } => ErrorKind::Io,
            Error::RenderError(_) | Error::ConfigError(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller should be told to change the request rather than
    /// treat this as a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::MissingAsset)
    }
}
