//! Radio Browser as an Ondes source

use crate::client::RadioBrowserClient;
use crate::models::{Station, StationQuery};
use async_trait::async_trait;
use ondessource::{Channel, NowPlaying, Result, SourceAdapter, SourceCapabilities};

pub const SOURCE_ID: &str = "radiobrowser";
pub const SOURCE_NAME: &str = "Radio Browser";

/// Default number of stations in the catalog and in search results
pub const DEFAULT_LIMIT: usize = 100;

/// Community catalog of tens of thousands of stations
///
/// The catalog is the most clicked stations, optionally narrowed to a
/// country or a tag. Anything else is reached through search.
///
/// ```
/// use ondesradiobrowser::{RadioBrowserClient, RadioBrowserSource, StationQuery};
/// use ondessource::SourceAdapter;
///
/// # tokio_test::block_on(async {
/// let source = RadioBrowserSource::new(RadioBrowserClient::with_client(reqwest::Client::new()))
///     .with_catalog(StationQuery::top(20));
/// assert_eq!(source.catalog().limit, 20);
/// // Blank queries never reach a mirror
/// assert!(source.search("   ").await.unwrap().is_empty());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RadioBrowserSource {
    client: RadioBrowserClient,
    catalog: StationQuery,
}

impl RadioBrowserSource {
    pub fn new(client: RadioBrowserClient) -> Self {
        Self {
            client,
            catalog: StationQuery::top(DEFAULT_LIMIT),
        }
    }

    /// Restrict the catalog, e.g. to `countrycode: FR` or `tag: jazz`
    pub fn with_catalog(mut self, catalog: StationQuery) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &StationQuery {
        &self.catalog
    }
}

/// `None` for stations without any stream URL
pub(crate) fn to_channel(station: Station) -> Option<Channel> {
    let stream = station.stream_url()?.to_string();
    Some(
        Channel::new(SOURCE_ID, &station.stationuuid, station.name.trim(), stream)
            .with_genres(station.tags.iter())
            .with_image(station.favicon)
            .with_homepage(station.homepage)
            .with_country(station.countrycode)
            .with_codec(station.codec, station.bitrate)
            .with_listeners(station.clickcount),
    )
}

fn to_channels(stations: Vec<Station>) -> Vec<Channel> {
    let total = stations.len();
    let channels: Vec<Channel> = stations.into_iter().filter_map(to_channel).collect();
    if channels.len() < total {
        tracing::debug!(
            "Skipped {} Radio Browser stations without stream URL",
            total - channels.len()
        );
    }
    channels
}

#[async_trait]
impl SourceAdapter for RadioBrowserSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            supports_search: true,
            supports_click_reporting: true,
            ..Default::default()
        }
    }

    async fn fetch_channels(&self) -> Result<Vec<Channel>> {
        let stations = self.client.search(&self.catalog).await?;
        Ok(to_channels(stations))
    }

    async fn now_playing(&self, _local_id: &str) -> Result<Option<NowPlaying>> {
        Ok(None)
    }

    /// Resolving through `/json/url` counts a click for the station
    async fn stream_url(&self, local_id: &str) -> Result<String> {
        Ok(self.client.click(local_id).await?)
    }

    async fn search(&self, query: &str) -> Result<Vec<Channel>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let stations = self
            .client
            .search(&StationQuery::by_name(query, self.catalog.limit))
            .await?;
        Ok(to_channels(stations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(url: &str, url_resolved: &str) -> Station {
        Station {
            stationuuid: "96062a7b-0601-11e8-ae97-52543be04c81".to_string(),
            name: " BBC Radio 6 Music ".to_string(),
            url: url.to_string(),
            url_resolved: url_resolved.to_string(),
            homepage: Some("https://www.bbc.co.uk/6music".to_string()),
            favicon: Some(String::new()),
            tags: Some("alternative,Indie, rock".to_string()),
            countrycode: Some("GB".to_string()),
            codec: Some("AAC".to_string()),
            bitrate: Some(0),
            clickcount: Some(9000),
            lastcheckok: true,
        }
    }

    #[test]
    fn test_to_channel() {
        let channel = to_channel(station("http://a/6music.pls", "http://b/6music.aac")).unwrap();
        assert_eq!(channel.id, "radiobrowser:96062a7b-0601-11e8-ae97-52543be04c81");
        assert_eq!(channel.name, "BBC Radio 6 Music");
        assert_eq!(channel.stream_url, "http://b/6music.aac");
        assert_eq!(channel.genres, vec!["alternative", "indie", "rock"]);
        assert!(channel.image.is_none());
        assert_eq!(channel.codec.as_deref(), Some("aac"));
        assert!(channel.bitrate.is_none());
        assert_eq!(channel.listeners, Some(9000));
        assert_eq!(channel.country.as_deref(), Some("GB"));
    }

    #[test]
    fn test_to_channel_falls_back_to_url() {
        let channel = to_channel(station("http://a/6music.mp3", "")).unwrap();
        assert_eq!(channel.stream_url, "http://a/6music.mp3");
        assert!(to_channel(station("", " ")).is_none());
    }
}
