//! # OndesSource
//!
//! Common traits and types for Ondes radio sources.
//!
//! This crate provides the foundational abstractions shared by every radio
//! catalog adapter (SomaFM, Radio Paradise, NTS, KEXP, Radio Browser):
//!
//! - **Channel schema**: [`Channel`] and [`NowPlaying`], the normalized shape every
//!   adapter produces, identified by a `source:local` [`ChannelId`].
//! - **Adapter trait**: [`SourceAdapter`], implemented once per catalog.
//! - **Registry**: [`SourceRegistry`], which fans catalog fetches out to every
//!   adapter in parallel, isolates per-source failures, and routes per-channel
//!   operations back to the right adapter by parsing the ID prefix.
//! - **Filtering**: [`filter`] for search, genre and source filters plus sort orders.
//! - **Stream health**: [`health`] for probing stream URLs and polling them in the background.
//! - **Config extensions** (feature `ondesconfig`): [`SourcesConfigExt`] and
//!   [`LibraryConfigExt`] (favorites and recently played).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ondessource::SourceRegistry;
//! use std::sync::Arc;
//!
//! let registry = SourceRegistry::new();
//! registry.register(Arc::new(SomaFmSource::new().await?)).await;
//! registry.register(Arc::new(KexpSource::new().await?)).await;
//!
//! let report = registry.fetch_all().await;
//! for failure in &report.failures {
//!     eprintln!("{} failed: {}", failure.source, failure.message);
//! }
//! let url = registry.stream_url("somafm:groovesalad").await?;
//! ```

pub mod channel;
pub mod filter;
pub mod health;
pub mod registry;

#[cfg(feature = "ondesconfig")]
pub mod config_ext;

#[cfg(feature = "ondesconfig")]
pub mod library;

pub use channel::{normalize_genres, Channel, ChannelId, NowPlaying};
pub use filter::{ChannelFilter, SortOrder};
pub use health::{HealthMonitor, MIN_MONITOR_INTERVAL, StreamHealth, StreamHealthChecker};
pub use registry::{FetchReport, SourceFailure, SourceRegistry};

#[cfg(feature = "ondesconfig")]
pub use config_ext::SourcesConfigExt;

#[cfg(feature = "ondesconfig")]
pub use library::LibraryConfigExt;

pub use async_trait::async_trait;

use std::fmt::Debug;

/// Error types for source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source not available: {0}")]
    SourceUnavailable(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Invalid channel id: {0}")]
    InvalidChannelId(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Search not supported")]
    SearchNotSupported,

    #[error("Feature not supported: {0}")]
    NotSupported(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Source capabilities describing what features are supported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCapabilities {
    /// Provides live track or show information
    pub supports_now_playing: bool,
    /// Supports server-side catalog search
    pub supports_search: bool,
    /// Resolving a stream URL registers a play with the catalog
    pub supports_click_reporting: bool,
}

/// Main trait for radio catalog adapters
///
/// Each implementation translates one provider's API into the common
/// [`Channel`] schema. Channel ids produced by an adapter must be of the form
/// `"<adapter id>:<local id>"`; the registry hands only the local part back to
/// [`SourceAdapter::stream_url`] and [`SourceAdapter::now_playing`].
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so the registry can drive them
/// concurrently.
///
/// # Examples
///
/// ```rust,no_run
/// use ondessource::{Channel, NowPlaying, Result, SourceAdapter, SourceCapabilities};
///
/// #[derive(Debug)]
/// struct StaticRadio;
///
/// #[async_trait::async_trait]
/// impl SourceAdapter for StaticRadio {
///     fn id(&self) -> &str {
///         "static"
///     }
///
///     fn name(&self) -> &str {
///         "Static Radio"
///     }
///
///     fn capabilities(&self) -> SourceCapabilities {
///         SourceCapabilities::default()
///     }
///
///     async fn fetch_channels(&self) -> Result<Vec<Channel>> {
///         Ok(vec![Channel::new("static", "one", "One", "http://example.com/one.mp3")])
///     }
///
///     async fn now_playing(&self, _local_id: &str) -> Result<Option<NowPlaying>> {
///         Ok(None)
///     }
///
///     async fn stream_url(&self, local_id: &str) -> Result<String> {
///         Ok(format!("http://example.com/{}.mp3", local_id))
///     }
/// }
/// ```
#[async_trait]
pub trait SourceAdapter: Debug + Send + Sync {
    /// Machine-readable identifier, also the channel id prefix (e.g. `"somafm"`)
    fn id(&self) -> &str;

    /// Human-readable name of the catalog (e.g. `"SomaFM"`)
    fn name(&self) -> &str;

    /// Features this adapter supports
    fn capabilities(&self) -> SourceCapabilities;

    /// Fetch the full channel catalog, normalized
    async fn fetch_channels(&self) -> Result<Vec<Channel>>;

    /// Live information for one channel, `None` when the catalog has nothing to report
    async fn now_playing(&self, local_id: &str) -> Result<Option<NowPlaying>>;

    /// Playable stream URL for one channel
    async fn stream_url(&self, local_id: &str) -> Result<String>;

    /// Server-side search
    ///
    /// Adapters that do not support search keep the default implementation.
    async fn search(&self, _query: &str) -> Result<Vec<Channel>> {
        Err(SourceError::SearchNotSupported)
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}
