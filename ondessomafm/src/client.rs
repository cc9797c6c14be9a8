//! HTTP client for the SomaFM API

use crate::error::{Error, Result};
use crate::models::{ChannelsResponse, SomaChannel, Song, SongsResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Default SomaFM API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.somafm.com";

/// Default timeout for HTTP requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "ondessomafm/0.1.0";

/// SomaFM HTTP client
///
/// Stateless: every call hits the API. Catalog caching belongs to the
/// registry.
#[derive(Debug, Clone)]
pub struct SomaFmClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl SomaFmClient {
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client with a custom reqwest::Client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = Url::parse(&format!("{}/{}", self.base_url, path))?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "{} returned status {}",
                path,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Full channel list
    pub async fn channels(&self) -> Result<Vec<SomaChannel>> {
        let response: ChannelsResponse = self.get_json("channels.json").await?;
        tracing::debug!("SomaFM returned {} channels", response.channels.len());
        Ok(response.channels)
    }

    /// Recently played songs, most recent first
    pub async fn recent_songs(&self, channel: &str) -> Result<Vec<Song>> {
        if channel.is_empty() || !channel.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(Error::InvalidChannel(channel.to_string()));
        }
        let response: SongsResponse = self.get_json(&format!("songs/{}.json", channel)).await?;
        Ok(response.songs)
    }
}

/// Builder for configuring a SomaFmClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
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

    pub async fn build(self) -> Result<SomaFmClient> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder()
                    .user_agent(&self.user_agent)
                    .timeout(self.timeout);

                if let Some(proxy_url) = &self.proxy {
                    let proxy = reqwest::Proxy::all(proxy_url)
                        .map_err(|e| Error::other(format!("Invalid proxy: {}", e)))?;
                    builder = builder.proxy(proxy);
                }

                builder.build()?
            }
        };

        Ok(SomaFmClient {
            client,
            base_url: self.base_url,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_path_like_channel_ids() {
        let client = SomaFmClient::with_client(Client::new());
        assert!(matches!(
            client.recent_songs("../channels").await,
            Err(Error::InvalidChannel(_))
        ));
        assert!(matches!(client.recent_songs("").await, Err(Error::InvalidChannel(_))));
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let client = SomaFmClient::builder()
            .base_url("not a url")
            .build()
            .await
            .unwrap();
        assert!(matches!(client.channels().await, Err(Error::InvalidUrl(_))));
    }
}
