//! HTTP client for the NTS API

use crate::error::{Error, Result};
use crate::models::{LiveResponse, Mixtape, MixtapesResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default NTS base URL
pub const DEFAULT_BASE_URL: &str = "https://www.nts.live";

/// Default timeout for HTTP requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "ondesnts/0.1.0";

/// NTS HTTP client
#[derive(Debug, Clone)]
pub struct NtsClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl NtsClient {
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

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
        let url = format!("{}{}", self.base_url, path);
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

    /// Current and next broadcast on both live channels
    pub async fn live(&self) -> Result<LiveResponse> {
        self.get_json("/api/v2/live").await
    }

    /// Infinite Mixtapes
    pub async fn mixtapes(&self) -> Result<Vec<Mixtape>> {
        let response: MixtapesResponse = self.get_json("/api/v2/mixtapes").await?;
        Ok(response.results)
    }
}

/// Builder for configuring an NtsClient
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

    pub async fn build(self) -> Result<NtsClient> {
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

        Ok(NtsClient {
            client,
            base_url: self.base_url,
            timeout: self.timeout,
        })
    }
}
