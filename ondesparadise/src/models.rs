//! Data models for Radio Paradise API responses

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Deserialize a string or number into a u64
fn deserialize_string_or_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU64 {
        String(String),
        Number(u64),
    }

    match StringOrU64::deserialize(deserializer)? {
        StringOrU64::String(s) => s.parse::<u64>().map_err(D::Error::custom),
        StringOrU64::Number(n) => Ok(n),
    }
}

/// Deserialize an optional string or number into an Option<u64>
fn deserialize_optional_string_or_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU64 {
        String(String),
        Number(u64),
    }

    match Option::<StringOrU64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrU64::String(s)) if s.is_empty() => Ok(None),
        Some(StringOrU64::String(s)) => s.parse::<u64>().map(Some).map_err(D::Error::custom),
        Some(StringOrU64::Number(n)) => Ok(Some(n)),
    }
}

/// Block length comes in seconds as a string ("1715.54") or in ms as an integer
fn deserialize_length<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Float(f64),
        Int(u64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => {
            let seconds = s.parse::<f64>().map_err(D::Error::custom)?;
            Ok((seconds * 1000.0) as u64)
        }
        StringOrNumber::Float(f) => Ok((f * 1000.0) as u64),
        StringOrNumber::Int(i) => Ok(i),
    }
}

/// Deserialize an optional string or number into Option<u32>
fn deserialize_optional_string_or_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU32 {
        String(String),
        Number(u32),
    }

    match Option::<StringOrU32>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrU32::String(s)) if s.is_empty() => Ok(None),
        Some(StringOrU32::String(s)) => s.parse::<u32>().map(Some).map_err(D::Error::custom),
        Some(StringOrU32::Number(n)) => Ok(Some(n)),
    }
}

/// Bitrate quality levels accepted by the `get_block` endpoint
///
/// Only affects the block URL returned by the API; the metadata is the same
/// for every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Bitrate {
    /// 128 kbps MP3
    Mp3_128 = 0,
    /// AAC 64 kbps
    Aac64 = 1,
    /// AAC 128 kbps
    Aac128 = 2,
    /// AAC 320 kbps
    #[default]
    Aac320 = 3,
    /// FLAC lossless
    Flac = 4,
}

impl Bitrate {
    pub fn from_u8(value: u8) -> Result<Self, crate::error::Error> {
        match value {
            0 => Ok(Self::Mp3_128),
            1 => Ok(Self::Aac64),
            2 => Ok(Self::Aac128),
            3 => Ok(Self::Aac320),
            4 => Ok(Self::Flac),
            _ => Err(crate::error::Error::InvalidBitrate(value)),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Duration in milliseconds
pub type DurationMs = u64;

/// Event ID for block identification
pub type EventId = u64;

/// A song within a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub artist: String,
    pub title: String,

    /// Missing for promos/announcements
    #[serde(default)]
    pub album: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string_or_u32")]
    pub year: Option<u32>,

    /// Offset from the start of the block, in milliseconds
    #[serde(deserialize_with = "deserialize_string_or_u64")]
    pub elapsed: DurationMs,

    #[serde(deserialize_with = "deserialize_string_or_u64")]
    pub duration: DurationMs,

    /// Cover path, relative to the block's `image_base`
    #[serde(default)]
    pub cover: Option<String>,
}

impl Song {
    pub fn end_time_ms(&self) -> DurationMs {
        self.elapsed.saturating_add(self.duration)
    }

    pub fn contains_timestamp(&self, timestamp_ms: DurationMs) -> bool {
        timestamp_ms >= self.elapsed && timestamp_ms < self.end_time_ms()
    }
}

/// A block of songs from Radio Paradise
///
/// Radio Paradise schedules music in blocks: one continuous audio file
/// holding several songs, with the offset of each song inside the block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(deserialize_with = "deserialize_string_or_u64")]
    pub event: EventId,

    #[serde(deserialize_with = "deserialize_string_or_u64")]
    pub end_event: EventId,

    #[serde(deserialize_with = "deserialize_length")]
    pub length: DurationMs,

    pub url: String,

    #[serde(default)]
    pub image_base: Option<String>,

    /// Wall-clock start of the block on the broadcast, in Unix milliseconds
    #[serde(default, deserialize_with = "deserialize_optional_string_or_u64")]
    pub sched_time_millis: Option<u64>,

    /// Song index ("0", "1", ...) to song
    #[serde(default)]
    pub song: HashMap<String, Song>,
}

impl Block {
    /// Songs in block order
    pub fn songs_ordered(&self) -> Vec<(usize, &Song)> {
        let mut songs: Vec<_> = self
            .song
            .iter()
            .filter_map(|(k, v)| k.parse::<usize>().ok().map(|idx| (idx, v)))
            .collect();
        songs.sort_by_key(|(idx, _)| *idx);
        songs
    }

    pub fn get_song(&self, index: usize) -> Option<&Song> {
        self.song.get(&index.to_string())
    }

    pub fn song_count(&self) -> usize {
        self.song.len()
    }

    pub fn cover_url(&self, cover_path: &str) -> Option<String> {
        self.image_base
            .as_ref()
            .map(|base| format!("{}{}", base, cover_path))
    }

    /// Song playing at a given offset from the block start
    pub fn song_at_timestamp(&self, timestamp_ms: DurationMs) -> Option<(usize, &Song)> {
        self.songs_ordered()
            .into_iter()
            .find(|(_, song)| song.contains_timestamp(timestamp_ms))
    }

    /// Wall-clock start of the block, when the API reports it
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.sched_time_millis?).ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Offset into the block at `now`, if the block is on air
    pub fn offset_at(&self, now: DateTime<Utc>) -> Option<DurationMs> {
        let started = self.started_at()?;
        let offset = u64::try_from((now - started).num_milliseconds()).ok()?;
        (offset < self.length).then_some(offset)
    }
}

/// The song currently on air for a channel
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub block: Block,
    pub current_song_index: Option<usize>,
    pub current_song: Option<Song>,
    /// Offset into the block; `None` when the block schedule is unknown
    pub block_elapsed_ms: Option<DurationMs>,
}

impl NowPlaying {
    /// Locate the song on air at `now`, falling back to the first song
    pub fn from_block_at(block: Block, now: DateTime<Utc>) -> Self {
        let offset = block.offset_at(now);
        let located = offset
            .and_then(|ms| block.song_at_timestamp(ms))
            .or_else(|| block.songs_ordered().into_iter().next())
            .map(|(idx, song)| (idx, song.clone()));

        let (current_song_index, current_song) = match located {
            Some((idx, song)) => (Some(idx), Some(song)),
            None => (None, None),
        };

        Self {
            block,
            current_song_index,
            current_song,
            block_elapsed_ms: offset,
        }
    }

    pub fn cover_url(&self) -> Option<String> {
        let cover = self.current_song.as_ref()?.cover.as_deref()?;
        self.block.cover_url(cover)
    }

    /// Start and end of the current song, when the block schedule is known
    pub fn song_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let started = self.block.started_at()?;
        let song = self.current_song.as_ref()?;
        let at = |ms: DurationMs| {
            let delta = chrono::Duration::try_milliseconds(i64::try_from(ms).ok()?)?;
            started.checked_add_signed(delta)
        };
        Some((at(song.elapsed)?, at(song.end_time_ms())?))
    }
}
