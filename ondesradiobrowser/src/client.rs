//! HTTP client for the Radio Browser API
//!
//! Radio Browser is run as a set of community mirrors sharing one database.
//! The client tries them in order, starting from the last one that answered,
//! and moves on to the next mirror only when a request fails at the
//! transport level (connection refused, timeout). An error status from a
//! mirror that answered is returned as is.

use crate::error::{Error, Result};
use crate::models::{ClickResponse, Station, StationQuery};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default mirrors, tried in order
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://de1.api.radio-browser.info",
    "https://nl1.api.radio-browser.info",
    "https://at1.api.radio-browser.info",
];

/// Default timeout for HTTP requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default User-Agent; Radio Browser asks clients to identify themselves
pub const DEFAULT_USER_AGENT: &str = "ondesradiobrowser/0.1.0";

/// Radio Browser HTTP client
#[derive(Debug, Clone)]
pub struct RadioBrowserClient {
    client: Client,
    mirrors: Vec<String>,
    /// Index of the last mirror that answered
    preferred: Arc<AtomicUsize>,
    timeout: Duration,
}

impl RadioBrowserClient {
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            preferred: Arc::new(AtomicUsize::new(0)),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }

    /// Mirror the next request starts from
    pub fn current_mirror(&self) -> &str {
        let idx = self.preferred.load(Ordering::Relaxed) % self.mirrors.len();
        &self.mirrors[idx]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let start = self.preferred.load(Ordering::Relaxed);
        let mut last_error = None;

        for offset in 0..self.mirrors.len() {
            let idx = (start + offset) % self.mirrors.len();
            let mirror = &self.mirrors[idx];

            match self.get_json_from(mirror, path, query).await {
                Ok(value) => {
                    if offset > 0 {
                        tracing::info!("Radio Browser switched to mirror {}", mirror);
                    }
                    self.preferred.store(idx, Ordering::Relaxed);
                    return Ok(value);
                }
                Err(e) if e.is_transport() => {
                    tracing::warn!("Radio Browser mirror {} unreachable: {}", mirror, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::AllMirrorsFailed(
            last_error.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    async fn get_json_from<T: DeserializeOwned>(
        &self,
        mirror: &str,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let mut url = Url::parse(&format!("{}{}", mirror, path))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
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

    pub async fn search(&self, query: &StationQuery) -> Result<Vec<Station>> {
        let stations: Vec<Station> = self
            .get_json("/json/stations/search", &query.to_pairs())
            .await?;
        tracing::debug!("Radio Browser returned {} stations", stations.len());
        Ok(stations)
    }

    pub async fn station(&self, uuid: &str) -> Result<Station> {
        check_uuid(uuid)?;
        let stations: Vec<Station> = self
            .get_json(&format!("/json/stations/byuuid/{}", uuid), &[])
            .await?;
        stations
            .into_iter()
            .next()
            .ok_or_else(|| Error::StationNotFound(uuid.to_string()))
    }

    /// Register a play and get the station's resolved stream URL
    pub async fn click(&self, uuid: &str) -> Result<String> {
        check_uuid(uuid)?;
        let click: ClickResponse = self.get_json(&format!("/json/url/{}", uuid), &[]).await?;

        match click.url.filter(|u| !u.is_empty()) {
            Some(url) if click.ok => Ok(url),
            _ => Err(Error::StationNotFound(format!(
                "{} ({})",
                uuid,
                click.message.unwrap_or_else(|| "no url".to_string())
            ))),
        }
    }
}

/// Station uuids are hex digits and dashes
fn check_uuid(uuid: &str) -> Result<()> {
    if !uuid.is_empty() && uuid.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        Ok(())
    } else {
        Err(Error::InvalidStation(uuid.to_string()))
    }
}

/// Builder for configuring a RadioBrowserClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    mirrors: Vec<String>,
    timeout: Duration,
    user_agent: String,
    proxy: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
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

    /// Use a single base URL instead of the mirror list
    pub fn base_url(self, url: impl Into<String>) -> Self {
        self.mirrors([url.into()])
    }

    /// Replace the mirror list; empty entries are ignored
    pub fn mirrors<I, S>(mut self, mirrors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mirrors = mirrors
            .into_iter()
            .map(|m| m.into().trim_end_matches('/').to_string())
            .filter(|m| !m.is_empty())
            .collect();
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

    pub async fn build(self) -> Result<RadioBrowserClient> {
        if self.mirrors.is_empty() {
            return Err(Error::other("No Radio Browser mirror configured"));
        }

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

        Ok(RadioBrowserClient {
            client,
            mirrors: self.mirrors,
            preferred: Arc::new(AtomicUsize::new(0)),
            timeout: self.timeout,
        })
    }
}
