//! Data models for the NTS v2 API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `/api/v2/live`
#[derive(Debug, Clone, Deserialize)]
pub struct LiveResponse {
    #[serde(default)]
    pub results: Vec<LiveChannel>,
}

impl LiveResponse {
    pub fn channel(&self, name: &str) -> Option<&LiveChannel> {
        self.results.iter().find(|c| c.channel_name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveChannel {
    /// "1" or "2"
    pub channel_name: String,
    pub now: Broadcast,
    #[serde(default)]
    pub next: Option<Broadcast>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcast {
    pub broadcast_title: String,
    #[serde(default)]
    pub start_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embeds: Option<Embeds>,
}

impl Broadcast {
    pub fn details(&self) -> Option<&ShowDetails> {
        self.embeds.as_ref()?.details.as_ref()
    }

    /// Show title with HTML entities the API leaves in place decoded
    pub fn title(&self) -> String {
        decode_entities(&self.broadcast_title)
    }

    pub fn picture(&self) -> Option<&str> {
        self.details()?.media.as_ref()?.picture_large.as_deref()
    }

    pub fn genres(&self) -> Vec<&str> {
        self.details()
            .map(|d| d.genres.iter().map(|g| g.value.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embeds {
    #[serde(default)]
    pub details: Option<ShowDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub media: Option<Media>,
    #[serde(default)]
    pub location_long: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub picture_large: Option<String>,
}

/// Response of `/api/v2/mixtapes`
#[derive(Debug, Clone, Deserialize)]
pub struct MixtapesResponse {
    #[serde(default)]
    pub results: Vec<Mixtape>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mixtape {
    pub mixtape_alias: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub audio_stream_endpoint: String,
    #[serde(default)]
    pub media: Option<Media>,
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_parse() {
        let json = r#"{
            "results": [{
                "channel_name": "1",
                "now": {
                    "broadcast_title": "Charlie Bones &amp; Friends",
                    "start_timestamp": "2024-05-01T09:00:00Z",
                    "end_timestamp": "2024-05-01T11:00:00Z",
                    "embeds": {"details": {
                        "name": "The Do!! You!!! Breakfast Show",
                        "genres": [{"id": "jazz", "value": "Jazz"}, {"id": "soul", "value": "Soul"}],
                        "media": {"picture_large": "https://media.ntslive.co.uk/crop/770x770/bones.jpg"},
                        "location_long": "London"
                    }}
                }
            }]
        }"#;

        let live: LiveResponse = serde_json::from_str(json).unwrap();
        let channel = live.channel("1").unwrap();
        assert_eq!(channel.now.title(), "Charlie Bones & Friends");
        assert_eq!(channel.now.genres(), vec!["Jazz", "Soul"]);
        assert!(channel.now.picture().is_some());
        assert!(live.channel("2").is_none());
    }

    #[test]
    fn test_broadcast_without_embeds() {
        let json = r#"{"broadcast_title": "Replay"}"#;
        let broadcast: Broadcast = serde_json::from_str(json).unwrap();
        assert!(broadcast.genres().is_empty());
        assert!(broadcast.picture().is_none());
        assert!(broadcast.start_timestamp.is_none());
    }
}
