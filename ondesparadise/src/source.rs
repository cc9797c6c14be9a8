//! Radio Paradise as an Ondes source

use crate::channels::{ParadiseChannelKind, ALL_CHANNELS};
use crate::client::RadioParadiseClient;
use crate::models;
use async_trait::async_trait;
use ondessource::{Channel, NowPlaying, Result, SourceAdapter, SourceCapabilities};

pub const SOURCE_ID: &str = "radioparadise";
pub const SOURCE_NAME: &str = "Radio Paradise";
pub const HOMEPAGE: &str = "https://radioparadise.com";

/// The five Radio Paradise mixes
///
/// The catalog is static; only now-playing hits the network.
///
/// ```
/// use ondesparadise::{RadioParadiseClient, RadioParadiseSource};
/// use ondessource::SourceAdapter;
///
/// # tokio_test::block_on(async {
/// let source = RadioParadiseSource::new(RadioParadiseClient::with_client(reqwest::Client::new()));
/// let channels = source.fetch_channels().await.unwrap();
/// assert_eq!(channels.len(), 5);
/// assert!(channels.iter().any(|c| c.id == "radioparadise:main"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RadioParadiseSource {
    client: RadioParadiseClient,
}

impl RadioParadiseSource {
    pub fn new(client: RadioParadiseClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RadioParadiseClient {
        &self.client
    }

    fn channel(kind: ParadiseChannelKind) -> Channel {
        Channel::new(SOURCE_ID, kind.slug(), kind.display_name(), kind.stream_url())
            .with_description(kind.description())
            .with_genres(kind.genres())
            .with_homepage(Some(HOMEPAGE.to_string()))
            .with_codec(Some("aac".to_string()), Some(kind.bitrate_kbps()))
    }
}

fn to_now_playing(np: models::NowPlaying) -> Option<NowPlaying> {
    let artwork = np.cover_url();
    let window = np.song_window();
    let song = np.current_song?;
    Some(NowPlaying {
        title: Some(song.title),
        artist: Some(song.artist),
        album: song.album,
        artwork,
        show: None,
        started_at: window.map(|(start, _)| start),
        ends_at: window.map(|(_, end)| end),
    })
}

#[async_trait]
impl SourceAdapter for RadioParadiseSource {
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

    async fn fetch_channels(&self) -> Result<Vec<Channel>> {
        Ok(ALL_CHANNELS.iter().copied().map(Self::channel).collect())
    }

    async fn now_playing(&self, local_id: &str) -> Result<Option<NowPlaying>> {
        let kind: ParadiseChannelKind = local_id.parse()?;
        let np = self.client.now_playing(kind).await.map_err(|e| {
            tracing::warn!("Radio Paradise now playing failed for {}: {}", kind.slug(), e);
            e
        })?;
        Ok(to_now_playing(np))
    }

    async fn stream_url(&self, local_id: &str) -> Result<String> {
        let kind: ParadiseChannelKind = local_id.parse()?;
        Ok(kind.stream_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_catalog() {
        let source = RadioParadiseSource::new(RadioParadiseClient::with_client(reqwest::Client::new()));
        let channels = source.fetch_channels().await.unwrap();

        assert_eq!(channels.len(), 5);
        assert_eq!(channels[0].id, "radioparadise:main");
        assert_eq!(channels[0].stream_url, "https://stream.radioparadise.com/aac-320");
        assert_eq!(channels[0].bitrate, Some(320));
        assert!(channels.iter().all(|c| c.id.starts_with("radioparadise:")));
        assert!(channels[4].genres.contains(&"ambient".to_string()));
    }

    #[tokio::test]
    async fn test_stream_url_unknown_channel() {
        let source = RadioParadiseSource::new(RadioParadiseClient::with_client(reqwest::Client::new()));
        assert_eq!(
            source.stream_url("mellow").await.unwrap(),
            "https://stream.radioparadise.com/mellow-320"
        );
        assert!(matches!(
            source.stream_url("polka").await,
            Err(ondessource::SourceError::ChannelNotFound(_))
        ));
    }
}
