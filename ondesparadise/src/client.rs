//! HTTP client for Radio Paradise API

use crate::channels::ParadiseChannelKind;
use crate::error::{Error, Result};
use crate::models::{Bitrate, Block, EventId, NowPlaying};
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default Radio Paradise API base URL
pub const DEFAULT_API_BASE: &str = "https://api.radioparadise.com/api";

/// Default image base URL
pub const DEFAULT_IMAGE_BASE: &str = "https://img.radioparadise.com/";

/// Default timeout for metadata HTTP requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "ondesparadise/0.1.0";

/// Radio Paradise HTTP client
///
/// Reads block metadata to find out what is on air on each channel.
///
/// # Example
///
/// ```no_run
/// use ondesparadise::{ParadiseChannelKind, RadioParadiseClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = RadioParadiseClient::new().await?;
///     let now = client.now_playing(ParadiseChannelKind::Mellow).await?;
///     if let Some(song) = now.current_song {
///         println!("Now playing: {} - {}", song.artist, song.title);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RadioParadiseClient {
    client: Client,
    api_base: String,
    bitrate: Bitrate,
    request_timeout: Duration,
}

impl RadioParadiseClient {
    /// Create a new client with default settings
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client with a custom reqwest::Client, keeping default settings
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            bitrate: Bitrate::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Get a block for a channel
    ///
    /// If `event` is None, returns the block currently on air.
    pub async fn get_block(
        &self,
        channel: ParadiseChannelKind,
        event: Option<EventId>,
    ) -> Result<Block> {
        let mut url = Url::parse(&format!("{}/get_block", self.api_base))?;

        url.query_pairs_mut()
            .append_pair("bitrate", &self.bitrate.as_u8().to_string())
            .append_pair("info", "true")
            .append_pair("channel", &channel.id().to_string());

        if let Some(event_id) = event {
            url.query_pairs_mut()
                .append_pair("event", &event_id.to_string());
        }

        tracing::debug!("Fetching block: {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "get_block returned status {}",
                response.status()
            )));
        }

        let mut block: Block = response.json().await?;

        // The API sends protocol-relative image bases (//img.radioparadise.com/)
        match block.image_base.as_deref() {
            Some(base) if base.starts_with("//") => {
                block.image_base = Some(format!("https:{}", base));
            }
            Some(_) => {}
            None => block.image_base = Some(DEFAULT_IMAGE_BASE.to_string()),
        }

        tracing::debug!(
            "Received block: channel={}, event={}, songs={}",
            channel.slug(),
            block.event,
            block.song_count()
        );

        Ok(block)
    }

    /// Song currently on air for a channel
    pub async fn now_playing(&self, channel: ParadiseChannelKind) -> Result<NowPlaying> {
        let block = self.get_block(channel, None).await?;
        Ok(NowPlaying::from_block_at(block, Utc::now()))
    }
}

/// Builder for configuring a RadioParadiseClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    bitrate: Bitrate,
    request_timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            bitrate: Bitrate::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bitrate passed to `get_block`
    pub fn bitrate(mut self, bitrate: Bitrate) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<RadioParadiseClient> {
        let client = if let Some(client) = self.client {
            client
        } else {
            let mut builder = Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.request_timeout);

            if let Some(proxy_url) = &self.proxy {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::other(format!("Invalid proxy: {}", e)))?;
                builder = builder.proxy(proxy);
            }

            builder.build()?
        };

        Ok(RadioParadiseClient {
            client,
            api_base: self.api_base,
            bitrate: self.bitrate,
            request_timeout: self.request_timeout,
        })
    }
}
