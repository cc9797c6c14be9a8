//! Error types for the Radio Browser client

use ondessource::SourceError;

/// Result type alias for Radio Browser operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A mirror answered with an error status
    #[error("API error: {0}")]
    Api(String),

    /// Every configured mirror failed at the transport level
    #[error("All Radio Browser mirrors failed, last error: {0}")]
    AllMirrorsFailed(String),

    #[error("Invalid station uuid: {0}")]
    InvalidStation(String),

    #[error("Station not found: {0}")]
    StationNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Errors worth retrying on the next mirror
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

impl From<Error> for SourceError {
    fn from(err: Error) -> Self {
        match err {
            Error::Http(e) => e.into(),
            Error::Json(e) => SourceError::Parse(e.to_string()),
            Error::InvalidStation(id) | Error::StationNotFound(id) => {
                SourceError::ChannelNotFound(format!("radiobrowser:{}", id))
            }
            other => SourceError::SourceUnavailable(other.to_string()),
        }
    }
}
