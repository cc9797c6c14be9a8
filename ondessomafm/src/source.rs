//! SomaFM as an Ondes source

use crate::client::SomaFmClient;
use crate::models::{SomaChannel, Song};
use async_trait::async_trait;
use ondessource::{Channel, NowPlaying, Result, SourceAdapter, SourceCapabilities, SourceError};

pub const SOURCE_ID: &str = "somafm";
pub const SOURCE_NAME: &str = "SomaFM";

/// Codec and bitrate of the mount returned by [`stream_url_for`]
pub const STREAM_CODEC: &str = "mp3";
pub const STREAM_BITRATE_KBPS: u32 = 128;

/// Direct Icecast mount; skips the PLS indirection
pub fn stream_url_for(id: &str) -> String {
    format!(
        "https://ice1.somafm.com/{}-{}-{}",
        id, STREAM_BITRATE_KBPS, STREAM_CODEC
    )
}

pub fn homepage_for(id: &str) -> String {
    format!("https://somafm.com/{}/", id)
}

/// SomaFM as an Ondes source
///
/// Stream URLs are derived from the channel id without a network round trip:
///
/// ```
/// use ondessomafm::{SomaFmClient, SomaFmSource};
/// use ondessource::SourceAdapter;
///
/// # tokio_test::block_on(async {
/// let source = SomaFmSource::new(SomaFmClient::with_client(reqwest::Client::new()));
/// let url = source.stream_url("groovesalad").await.unwrap();
/// assert_eq!(url, "https://ice1.somafm.com/groovesalad-128-mp3");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct SomaFmSource {
    client: SomaFmClient,
}

impl SomaFmSource {
    pub fn new(client: SomaFmClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SomaFmClient {
        &self.client
    }
}

pub(crate) fn to_channel(soma: SomaChannel) -> Channel {
    let image = soma.best_image().map(str::to_string);
    let now_playing = soma.last_playing.as_deref().and_then(NowPlaying::from_combined);
    let description = match (&soma.description, &soma.dj) {
        (Some(desc), Some(dj)) if !dj.is_empty() => format!("{} (DJ: {})", desc, dj),
        (Some(desc), _) => desc.clone(),
        (None, _) => String::new(),
    };

    Channel::new(SOURCE_ID, &soma.id, &soma.title, stream_url_for(&soma.id))
        .with_description(description)
        .with_genres(soma.genre.iter())
        .with_image(image)
        .with_homepage(Some(homepage_for(&soma.id)))
        .with_listeners(soma.listeners)
        .with_codec(Some(STREAM_CODEC.to_string()), Some(STREAM_BITRATE_KBPS))
        .with_now_playing(now_playing)
}

fn to_now_playing(song: Song) -> NowPlaying {
    let started_at = song.played_at();
    NowPlaying {
        title: song.title.filter(|s| !s.is_empty()),
        artist: song.artist.filter(|s| !s.is_empty()),
        album: song.album.filter(|s| !s.is_empty()),
        artwork: song.albumart.filter(|s| !s.is_empty()),
        show: None,
        started_at,
        ends_at: None,
    }
}

#[async_trait]
impl SourceAdapter for SomaFmSource {
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
        let channels = self.client.channels().await?;
        Ok(channels.into_iter().map(to_channel).collect())
    }

    async fn now_playing(&self, local_id: &str) -> Result<Option<NowPlaying>> {
        let songs = self.client.recent_songs(local_id).await?;
        Ok(songs
            .into_iter()
            .next()
            .map(to_now_playing)
            .filter(|np| !np.is_empty()))
    }

    async fn stream_url(&self, local_id: &str) -> Result<String> {
        if local_id.is_empty() {
            return Err(SourceError::ChannelNotFound(format!("{}:", SOURCE_ID)));
        }
        Ok(stream_url_for(local_id))
    }
}
