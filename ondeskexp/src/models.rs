//! Data models for the KEXP v2 API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Paginated response of `/v2/plays/`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaysResponse {
    #[serde(default)]
    pub results: Vec<Play>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    Trackplay,
    Airbreak,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Play {
    pub id: u64,
    pub play_type: PlayType,
    #[serde(default)]
    pub airdate: Option<DateTime<Utc>>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub thumbnail_uri: Option<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
    /// Show id
    #[serde(default)]
    pub show: Option<u64>,
}

impl Play {
    pub fn is_track(&self) -> bool {
        self.play_type == PlayType::Trackplay
    }

    pub fn artwork(&self) -> Option<&str> {
        [&self.image_uri, &self.thumbnail_uri]
            .into_iter()
            .filter_map(|uri| uri.as_deref())
            .find(|uri| !uri.is_empty())
    }
}

/// Response of `/v2/shows/<id>/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: u64,
    #[serde(default)]
    pub program_name: Option<String>,
    #[serde(default)]
    pub host_names: Vec<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
}

impl Show {
    /// "Program with Host" when the hosts are known
    pub fn display_name(&self) -> Option<String> {
        let program = self.program_name.as_deref().filter(|p| !p.is_empty())?;
        if self.host_names.is_empty() {
            Some(program.to_string())
        } else {
            Some(format!("{} with {}", program, self.host_names.join(" & ")))
        }
    }
}
