//! KEXP as an Ondes source

use crate::client::KexpClient;
use crate::models::Play;
use async_trait::async_trait;
use ondessource::{Channel, NowPlaying, Result, SourceAdapter, SourceCapabilities, SourceError};

pub const SOURCE_ID: &str = "kexp";
pub const SOURCE_NAME: &str = "KEXP";
pub const LOCAL_ID: &str = "kexp";
pub const STREAM_URL: &str = "https://kexp-mp3-128.streamguys1.com/kexp128.mp3";
pub const HOMEPAGE: &str = "https://www.kexp.org";

/// KEXP 90.3 FM, a single channel
///
/// ```
/// use ondeskexp::{KexpClient, KexpSource};
/// use ondessource::SourceAdapter;
///
/// # tokio_test::block_on(async {
/// let source = KexpSource::new(KexpClient::with_client(reqwest::Client::new()));
/// let channels = source.fetch_channels().await.unwrap();
/// assert_eq!(channels.len(), 1);
/// assert_eq!(channels[0].id, "kexp:kexp");
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct KexpSource {
    client: KexpClient,
}

impl KexpSource {
    pub fn new(client: KexpClient) -> Self {
        Self { client }
    }

    /// Show name for a play, `None` if the lookup fails
    async fn show_name(&self, play: &Play) -> Option<String> {
        let id = play.show?;
        match self.client.show(id).await {
            Ok(show) => show.display_name(),
            Err(e) => {
                tracing::debug!("KEXP show {} lookup failed: {}", id, e);
                None
            }
        }
    }

    fn check_local(local_id: &str) -> Result<()> {
        if local_id == LOCAL_ID {
            Ok(())
        } else {
            Err(SourceError::ChannelNotFound(format!("{}:{}", SOURCE_ID, local_id)))
        }
    }
}

pub(crate) fn play_to_now_playing(play: &Play, show: Option<String>) -> NowPlaying {
    if play.is_track() {
        NowPlaying {
            title: play.song.clone().filter(|s| !s.is_empty()),
            artist: play.artist.clone().filter(|s| !s.is_empty()),
            album: play.album.clone().filter(|s| !s.is_empty()),
            artwork: play.artwork().map(str::to_string),
            show,
            started_at: play.airdate,
            ends_at: None,
        }
    } else {
        // Air break: DJ talking, only the show is meaningful
        NowPlaying {
            show,
            started_at: play.airdate,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SourceAdapter for KexpSource {
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
        Ok(vec![Channel::new(SOURCE_ID, LOCAL_ID, "KEXP 90.3 FM", STREAM_URL)
            .with_description("Listener-powered radio from Seattle")
            .with_genres(["indie", "alternative", "eclectic"])
            .with_homepage(Some(HOMEPAGE.to_string()))
            .with_country(Some("US".to_string()))
            .with_codec(Some("mp3".to_string()), Some(128))])
    }

    async fn now_playing(&self, local_id: &str) -> Result<Option<NowPlaying>> {
        Self::check_local(local_id)?;

        let Some(play) = self.client.latest_play().await? else {
            return Ok(None);
        };
        let show = self.show_name(&play).await;
        let np = play_to_now_playing(&play, show);
        Ok((!np.is_empty()).then_some(np))
    }

    async fn stream_url(&self, local_id: &str) -> Result<String> {
        Self::check_local(local_id)?;
        Ok(STREAM_URL.to_string())
    }
}
