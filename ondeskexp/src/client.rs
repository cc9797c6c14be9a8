//! HTTP client for the KEXP API

use crate::error::{Error, Result};
use crate::models::{Play, PlaysResponse, Show};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default KEXP API base URL
pub const DEFAULT_API_BASE: &str = "https://api.kexp.org";

/// Default timeout for HTTP requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "ondeskexp/0.1.0";

/// KEXP HTTP client
#[derive(Debug, Clone)]
pub struct KexpClient {
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl KexpClient {
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
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

    /// Most recent play, track or air break
    pub async fn latest_play(&self) -> Result<Option<Play>> {
        let plays: PlaysResponse = self.get_json("/v2/plays/?limit=1").await?;
        Ok(plays.results.into_iter().next())
    }

    pub async fn show(&self, id: u64) -> Result<Show> {
        self.get_json(&format!("/v2/shows/{}/", id)).await
    }
}

/// Builder for configuring a KexpClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
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

    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
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

    pub async fn build(self) -> Result<KexpClient> {
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

        Ok(KexpClient {
            client,
            api_base: self.api_base,
            timeout: self.timeout,
        })
    }
}
