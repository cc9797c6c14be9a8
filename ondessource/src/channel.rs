//! Normalized channel schema shared by every source adapter

use crate::{Result, SourceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the source id and the adapter-local id
pub const ID_SEPARATOR: char = ':';

/// Parsed channel identifier (`"<source>:<local>"`)
///
/// Only the first separator is significant: `"nts:mixtape:x"` has source
/// `nts` and local id `mixtape:x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    pub source: String,
    pub local: String,
}

impl ChannelId {
    pub fn new(source: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            local: local.into(),
        }
    }

    /// Parse a textual channel id
    pub fn parse(id: &str) -> Result<Self> {
        let (source, local) = id
            .split_once(ID_SEPARATOR)
            .ok_or_else(|| SourceError::InvalidChannelId(id.to_string()))?;

        if source.is_empty() || local.is_empty() {
            return Err(SourceError::InvalidChannelId(id.to_string()));
        }

        Ok(Self::new(source, local))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.source, ID_SEPARATOR, self.local)
    }
}

impl FromStr for ChannelId {
    type Err = SourceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Live information about what a channel is playing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Cover or show artwork URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    /// Show or broadcast name, for talk and DJ programming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

impl NowPlaying {
    /// Build from a `"Artist - Title"` string, as several catalogs expose it
    ///
    /// Without a separator the whole string becomes the title.
    pub fn from_combined(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let np = match text.split_once(" - ") {
            Some((artist, title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
                NowPlaying {
                    artist: Some(artist.trim().to_string()),
                    title: Some(title.trim().to_string()),
                    ..Default::default()
                }
            }
            _ => NowPlaying {
                title: Some(text.to_string()),
                ..Default::default()
            },
        };
        Some(np)
    }

    /// One-line rendering: `"Artist - Title"`, then title, then show
    pub fn display(&self) -> Option<String> {
        match (&self.artist, &self.title, &self.show) {
            (Some(artist), Some(title), _) => Some(format!("{} - {}", artist, title)),
            (None, Some(title), _) => Some(title.clone()),
            (Some(artist), None, _) => Some(artist.clone()),
            (None, None, Some(show)) => Some(show.clone()),
            (None, None, None) => None,
        }
    }

    /// True when no field carries information
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.show.is_none()
    }
}

/// One radio station, as every adapter normalizes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Full channel id, `"<source>:<local>"`
    pub id: String,
    /// Adapter id
    pub source: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lower-cased, deduplicated genre tags
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub stream_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listeners: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Bitrate in kbps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now_playing: Option<NowPlaying>,
}

impl Channel {
    pub fn new(
        source: impl Into<String>,
        local: impl Into<String>,
        name: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let id = ChannelId::new(source.clone(), local).to_string();
        Self {
            id,
            source,
            name: name.into(),
            description: None,
            genres: Vec::new(),
            image: None,
            stream_url: stream_url.into(),
            homepage: None,
            listeners: None,
            country: None,
            codec: None,
            bitrate: None,
            now_playing: None,
        }
    }

    /// Parsed form of [`Channel::id`]
    pub fn channel_id(&self) -> Result<ChannelId> {
        ChannelId::parse(&self.id)
    }

    /// Adapter-local part of the id
    pub fn local_id(&self) -> &str {
        self.id
            .split_once(ID_SEPARATOR)
            .map(|(_, local)| local)
            .unwrap_or(&self.id)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Replace genres; input is normalized with [`normalize_genres`]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for raw in genres {
            for genre in normalize_genres(raw.as_ref()) {
                if !out.contains(&genre) {
                    out.push(genre);
                }
            }
        }
        self.genres = out;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image.and_then(non_empty);
        self
    }

    pub fn with_homepage(mut self, homepage: Option<String>) -> Self {
        self.homepage = homepage.and_then(non_empty);
        self
    }

    pub fn with_listeners(mut self, listeners: Option<u32>) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country.and_then(non_empty);
        self
    }

    pub fn with_codec(mut self, codec: Option<String>, bitrate: Option<u32>) -> Self {
        self.codec = codec.and_then(non_empty).map(|c| c.to_lowercase());
        self.bitrate = bitrate.filter(|b| *b > 0);
        self
    }

    pub fn with_now_playing(mut self, now_playing: Option<NowPlaying>) -> Self {
        self.now_playing = now_playing.filter(|np| !np.is_empty());
        self
    }
}

/// Split a raw genre string into normalized tags
///
/// Catalogs use `|`, `,`, `/` or `;` as separators. Tags are trimmed and
/// lower-cased; empty tags are dropped and duplicates removed (first wins).
pub fn normalize_genres(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(['|', ',', '/', ';']) {
        let tag = part.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}
