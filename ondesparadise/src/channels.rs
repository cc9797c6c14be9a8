//! Radio Paradise channel definitions
//!
//! This module defines the available Radio Paradise channels and their metadata.

use crate::error::Error;
use std::str::FromStr;

/// Base URL of the Icecast streams
pub const STREAM_BASE: &str = "https://stream.radioparadise.com";

/// Logical identifier for a Radio Paradise channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParadiseChannelKind {
    Main,
    Mellow,
    Rock,
    Global,
    Serenity,
}

impl ParadiseChannelKind {
    pub const fn id(self) -> u8 {
        match self {
            Self::Main => 0,
            Self::Mellow => 1,
            Self::Rock => 2,
            Self::Global => 3,
            Self::Serenity => 42,
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Mellow => "mellow",
            Self::Rock => "rock",
            Self::Global => "global",
            Self::Serenity => "serenity",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Main => "Radio Paradise Main Mix",
            Self::Mellow => "Radio Paradise Mellow Mix",
            Self::Rock => "Radio Paradise Rock Mix",
            Self::Global => "Radio Paradise Global Mix",
            Self::Serenity => "Radio Paradise Serenity",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Main => "Eclectic mix of rock, world, electronica, and more",
            Self::Mellow => "Mellower, less aggressive music",
            Self::Rock => "Heavier, more guitar-driven music",
            Self::Global => "Curated worldwide selection",
            Self::Serenity => "Ambient soundscapes and nature sounds",
        }
    }

    pub const fn genres(self) -> &'static [&'static str] {
        match self {
            Self::Main => &["eclectic", "rock", "world", "electronica"],
            Self::Mellow => &["eclectic", "mellow", "acoustic"],
            Self::Rock => &["rock", "alternative"],
            Self::Global => &["world", "eclectic"],
            Self::Serenity => &["ambient", "chill"],
        }
    }

    /// Icecast mount, AAC 320 kbps
    pub fn mount(self) -> String {
        match self {
            Self::Main => "aac-320".to_string(),
            other => format!("{}-320", other.slug()),
        }
    }

    pub const fn bitrate_kbps(self) -> u32 {
        320
    }

    pub fn stream_url(self) -> String {
        format!("{}/{}", STREAM_BASE, self.mount())
    }
}

impl FromStr for ParadiseChannelKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "0" => Ok(Self::Main),
            "mellow" | "1" => Ok(Self::Mellow),
            "rock" | "2" => Ok(Self::Rock),
            "global" | "eclectic" | "3" => Ok(Self::Global),
            "serenity" | "42" => Ok(Self::Serenity),
            other => Err(Error::UnknownChannel(other.to_string())),
        }
    }
}

/// All available Radio Paradise channels
pub const ALL_CHANNELS: [ParadiseChannelKind; 5] = [
    ParadiseChannelKind::Main,
    ParadiseChannelKind::Mellow,
    ParadiseChannelKind::Rock,
    ParadiseChannelKind::Global,
    ParadiseChannelKind::Serenity,
];
