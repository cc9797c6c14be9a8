//! Error types for the Radio Paradise client

use ondessource::SourceError;

/// Result type alias for Radio Paradise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the Radio Paradise client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid bitrate
    #[error("Invalid bitrate value: {0} (must be 0-4)")]
    InvalidBitrate(u8),

    /// Unknown channel slug or id
    #[error("Unknown Radio Paradise channel: {0}")]
    UnknownChannel(String),

    /// API returned an error status
    #[error("API error: {0}")]
    Api(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<Error> for SourceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(e) => e.into(),
            Error::Json(e) => SourceError::Parse(e.to_string()),
            Error::UnknownChannel(id) => SourceError::ChannelNotFound(format!("radioparadise:{}", id)),
            Error::Api(msg) => SourceError::SourceUnavailable(msg),
            other => SourceError::SourceUnavailable(other.to_string()),
        }
    }
}
