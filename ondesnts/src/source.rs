//! NTS as an Ondes source
//!
//! Two live channels (`nts:1`, `nts:2`) plus the Infinite Mixtapes
//! (`nts:mixtape/<alias>`). Mixtape stream endpoints are only known from the
//! mixtapes listing, so the source keeps the last listing it saw.

use crate::client::NtsClient;
use crate::models::{LiveChannel, Mixtape};
use async_trait::async_trait;
use ondessource::{Channel, NowPlaying, Result, SourceAdapter, SourceCapabilities, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const SOURCE_ID: &str = "nts";
pub const SOURCE_NAME: &str = "NTS Radio";
pub const HOMEPAGE: &str = "https://www.nts.live";

const MIXTAPE_PREFIX: &str = "mixtape/";

/// Live channel name and its Icecast stream
pub const LIVE_CHANNELS: [(&str, &str); 2] = [
    ("1", "https://stream-relay-geo.ntslive.net/stream"),
    ("2", "https://stream-relay-geo.ntslive.net/stream2"),
];

fn live_stream(name: &str) -> Option<&'static str> {
    LIVE_CHANNELS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, url)| *url)
}

/// NTS live channels and Infinite Mixtapes
///
/// ```
/// use ondesnts::{NtsClient, NtsSource};
/// use ondessource::SourceAdapter;
///
/// # tokio_test::block_on(async {
/// let source = NtsSource::new(NtsClient::with_client(reqwest::Client::new()));
/// let url = source.stream_url("2").await.unwrap();
/// assert_eq!(url, "https://stream-relay-geo.ntslive.net/stream2");
/// assert!(source.stream_url("3").await.is_err());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct NtsSource {
    client: NtsClient,
    /// alias -> audio_stream_endpoint
    mixtapes: Arc<RwLock<HashMap<String, String>>>,
}

impl NtsSource {
    pub fn new(client: NtsClient) -> Self {
        Self {
            client,
            mixtapes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn remember_mixtapes(&self, mixtapes: &[Mixtape]) {
        let mut known = self.mixtapes.write().await;
        known.clear();
        known.extend(
            mixtapes
                .iter()
                .map(|m| (m.mixtape_alias.clone(), m.audio_stream_endpoint.clone())),
        );
    }

    async fn mixtape_endpoint(&self, alias: &str) -> Result<String> {
        if let Some(url) = self.mixtapes.read().await.get(alias) {
            return Ok(url.clone());
        }

        tracing::debug!("Mixtape {} not cached, reloading listing", alias);
        let mixtapes = self.client.mixtapes().await?;
        self.remember_mixtapes(&mixtapes).await;

        self.mixtapes
            .read()
            .await
            .get(alias)
            .cloned()
            .ok_or_else(|| {
                SourceError::ChannelNotFound(format!("{}:{}{}", SOURCE_ID, MIXTAPE_PREFIX, alias))
            })
    }
}

/// Show line: broadcast title, with its location when the API gives one
fn live_to_now_playing(live: &LiveChannel) -> NowPlaying {
    let title = live.now.title();
    let location = live
        .now
        .details()
        .and_then(|d| d.location_long.as_deref())
        .filter(|l| !l.is_empty());
    let show = match location {
        Some(loc) if !title.is_empty() => format!("{} ({})", title, loc),
        _ => title,
    };

    NowPlaying {
        artwork: live.now.picture().map(str::to_string),
        show: Some(show).filter(|s| !s.is_empty()),
        started_at: live.now.start_timestamp,
        ends_at: live.now.end_timestamp,
        ..Default::default()
    }
}

pub(crate) fn live_to_channel(live: &LiveChannel) -> Option<Channel> {
    let stream = live_stream(&live.channel_name)?;
    let description = live
        .now
        .details()
        .and_then(|d| d.description.clone())
        .unwrap_or_default();

    Some(
        Channel::new(
            SOURCE_ID,
            &live.channel_name,
            format!("NTS {}", live.channel_name),
            stream,
        )
        .with_description(description)
        .with_genres(live.now.genres())
        .with_image(live.now.picture().map(str::to_string))
        .with_homepage(Some(HOMEPAGE.to_string()))
        .with_codec(Some("mp3".to_string()), Some(128))
        .with_now_playing(Some(live_to_now_playing(live))),
    )
}

pub(crate) fn mixtape_to_channel(mixtape: &Mixtape) -> Channel {
    let description = mixtape
        .subtitle
        .clone()
        .or_else(|| mixtape.description.clone())
        .unwrap_or_default();

    Channel::new(
        SOURCE_ID,
        format!("{}{}", MIXTAPE_PREFIX, mixtape.mixtape_alias),
        format!("NTS Mixtape: {}", mixtape.title),
        &mixtape.audio_stream_endpoint,
    )
    .with_description(description)
    .with_genres(["mixtape"])
    .with_image(mixtape.media.as_ref().and_then(|m| m.picture_large.clone()))
    .with_homepage(Some(format!(
        "{}/infinite-mixtapes/{}",
        HOMEPAGE, mixtape.mixtape_alias
    )))
}

#[async_trait]
impl SourceAdapter for NtsSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            supports_now_playing: true,
            ..Default::default()
        }
    }

    /// Live channels are required; a failing mixtape listing only drops mixtapes
    async fn fetch_channels(&self) -> Result<Vec<Channel>> {
        let (live, mixtapes) = tokio::join!(self.client.live(), self.client.mixtapes());

        let live = live?;
        let mut channels: Vec<Channel> = LIVE_CHANNELS
            .iter()
            .filter_map(|(name, _)| live.channel(name))
            .filter_map(live_to_channel)
            .collect();

        match mixtapes {
            Ok(mixtapes) => {
                self.remember_mixtapes(&mixtapes).await;
                channels.extend(mixtapes.iter().map(mixtape_to_channel));
            }
            Err(e) => tracing::warn!("NTS mixtapes unavailable: {}", e),
        }

        Ok(channels)
    }

    async fn now_playing(&self, local_id: &str) -> Result<Option<NowPlaying>> {
        if local_id.starts_with(MIXTAPE_PREFIX) {
            return Ok(None);
        }
        if live_stream(local_id).is_none() {
            return Err(SourceError::ChannelNotFound(format!("{}:{}", SOURCE_ID, local_id)));
        }

        let live = self.client.live().await?;
        Ok(live.channel(local_id).map(live_to_now_playing))
    }

    async fn stream_url(&self, local_id: &str) -> Result<String> {
        if let Some(alias) = local_id.strip_prefix(MIXTAPE_PREFIX) {
            return self.mixtape_endpoint(alias).await;
        }
        live_stream(local_id)
            .map(str::to_string)
            .ok_or_else(|| SourceError::ChannelNotFound(format!("{}:{}", SOURCE_ID, local_id)))
    }
}
