//! Error types for the SomaFM client

use ondessource::SourceError;

/// Result type alias for SomaFM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the SomaFM client
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

    /// API returned an error status
    #[error("API error: {0}")]
    Api(String),

    /// Channel id rejected before any request
    #[error("Invalid SomaFM channel id: {0}")]
    InvalidChannel(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<Error> for SourceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(e) => e.into(),
            Error::Json(e) => SourceError::Parse(e.to_string()),
            Error::InvalidChannel(id) => SourceError::ChannelNotFound(format!("somafm:{}", id)),
            Error::Api(msg) => SourceError::SourceUnavailable(msg),
            other => SourceError::SourceUnavailable(other.to_string()),
        }
    }
}
