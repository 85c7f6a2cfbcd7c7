//! Error types for the filedeck library.

use thiserror::Error;

/// Main error type for filedeck operations.
#[derive(Error, Debug)]
pub enum BrowseError {
    /// Server answered with a non-success status.
    #[error("HTTP error: {status} {reason}")]
    Http { status: u16, reason: String },

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listing request exceeded the configured timeout.
    #[error("HTTP request timed out")]
    Timeout,

    /// Invalid or unexpected response from server.
    #[error("Invalid response from server")]
    InvalidResponse,

    /// Path segment was empty or contained a separator.
    #[error("Invalid path segment: {0:?}")]
    InvalidSegment(String),

    /// Tried to ascend past the length of a path.
    #[error("Depth {depth} out of range for path of length {len}")]
    OutOfRange { depth: usize, len: usize },

    /// Move destination was empty.
    #[error("Invalid destination: {0:?}")]
    InvalidDestination(String),

    /// Base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

impl BrowseError {
    /// Whether this error came from talking to the server, as opposed to a
    /// local precondition that was checked before any request was issued.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            BrowseError::Http { .. }
                | BrowseError::RequestError(_)
                | BrowseError::JsonError(_)
                | BrowseError::Timeout
                | BrowseError::InvalidResponse
        )
    }
}

/// Result type alias for filedeck operations.
pub type Result<T> = std::result::Result<T, BrowseError>;
