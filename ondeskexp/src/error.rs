//! Error types for the KEXP client

use ondessource::SourceError;

/// Result type alias for KEXP operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

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
            Error::Api(msg) | Error::Other(msg) => SourceError::SourceUnavailable(msg),
        }
    }
}
