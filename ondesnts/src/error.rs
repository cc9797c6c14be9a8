//! Error types for the NTS client

use ondessource::SourceError;

/// Result type alias for NTS operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    /// Local id that is neither a live channel nor a known mixtape
    #[error("Unknown NTS channel: {0}")]
    UnknownChannel(String),

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
            Error::UnknownChannel(id) => SourceError::ChannelNotFound(format!("nts:{}", id)),
            Error::Api(msg) => SourceError::SourceUnavailable(msg),
            Error::Other(msg) => SourceError::SourceUnavailable(msg),
        }
    }
}
