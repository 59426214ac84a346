//! Error types for the sheetcheck library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sheetcheck operations.
#[derive(Debug, Error)]
pub enum SheetcheckError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Validation rules file does not exist.
    #[error("validation rules file not found: '{path}'")]
    ConfigNotFound { path: PathBuf },

    /// Validation rules document is malformed.
    #[error("failed to parse validation rules '{path}': {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Sample sheet could not be parsed into sections.
    #[error("{message}")]
    SheetParse { message: String },

    /// SLIMS credentials are missing or the connection could not be set up.
    #[error("SLIMS connection error: {0}")]
    SlimsConnection(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for sheetcheck operations.
pub type Result<T> = std::result::Result<T, SheetcheckError>;
