//! Data models for the SomaFM JSON API

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// SomaFM sends counters as strings ("1234"), sometimes as numbers
fn deserialize_optional_string_or_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU32 {
        String(String),
        Number(u32),
    }

    Ok(match Option::<StringOrU32>::deserialize(deserializer)? {
        None => None,
        Some(StringOrU32::String(s)) => s.trim().parse::<u32>().ok(),
        Some(StringOrU32::Number(n)) => Some(n),
    })
}

/// Response of `channels.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsResponse {
    pub channels: Vec<SomaChannel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomaChannel {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dj: Option<String>,
    /// Pipe separated ("ambient|electronica")
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub largeimage: Option<String>,
    #[serde(default)]
    pub xlimage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u32")]
    pub listeners: Option<u32>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default, rename = "lastPlaying")]
    pub last_playing: Option<String>,
}

impl SomaChannel {
    /// Largest artwork available
    pub fn best_image(&self) -> Option<&str> {
        [&self.xlimage, &self.largeimage, &self.image]
            .into_iter()
            .filter_map(|img| img.as_deref())
            .find(|img| !img.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub url: String,
    /// `mp3`, `aac` or `aacp`
    pub format: String,
    /// `highest`, `high` or `low`
    pub quality: String,
}

/// Response of `songs/<id>.json`, most recent first
#[derive(Debug, Clone, Deserialize)]
pub struct SongsResponse {
    #[serde(default)]
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub albumart: Option<String>,
    /// Unix seconds, as a string
    #[serde(default)]
    pub date: Option<String>,
}

impl Song {
    pub fn played_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.date.as_deref()?.trim().parse::<i64>().ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        let json = r#"{
            "id": "groovesalad",
            "title": "Groove Salad",
            "description": "A nicely chilled plate of ambient beats.",
            "dj": "Rusty Hodge",
            "genre": "ambient|electronica",
            "image": "https://api.somafm.com/img/groovesalad120.png",
            "largeimage": "https://api.somafm.com/logos/256/groovesalad256.png",
            "xlimage": "",
            "listeners": "1543",
            "playlists": [
                {"url": "https://api.somafm.com/groovesalad130.pls", "format": "aac", "quality": "highest"},
                {"url": "https://api.somafm.com/groovesalad.pls", "format": "mp3", "quality": "high"},
                {"url": "https://api.somafm.com/groovesalad256.pls", "format": "mp3", "quality": "highest"}
            ],
            "lastPlaying": "Bonobo - Kong"
        }"#;

        let channel: SomaChannel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.listeners, Some(1543));
        assert_eq!(
            channel.best_image(),
            Some("https://api.somafm.com/logos/256/groovesalad256.png")
        );
        assert_eq!(channel.playlists.len(), 3);
        assert_eq!(channel.playlists[0].format, "aac");
    }

    #[test]
    fn test_song_date() {
        let song = Song {
            title: Some("Kong".into()),
            artist: Some("Bonobo".into()),
            album: None,
            albumart: None,
            date: Some("1700000000".into()),
        };
        assert_eq!(song.played_at().unwrap().timestamp(), 1_700_000_000);
    }
}
