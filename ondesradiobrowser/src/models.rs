//! Data models for the Radio Browser JSON API

use serde::{Deserialize, Deserializer, Serialize};

/// Radio Browser sends 0/1 for booleans, some mirrors true/false
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        None => false,
    })
}

/// One station as returned by `/json/stations/*`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub stationuuid: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_resolved: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    /// Comma separated
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub countrycode: Option<String>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub clickcount: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub lastcheckok: bool,
}

impl Station {
    /// Resolved stream URL, falling back to the declared one
    pub fn stream_url(&self) -> Option<&str> {
        [self.url_resolved.as_str(), self.url.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|u| !u.is_empty())
    }
}

/// Response of `/json/url/<uuid>`
#[derive(Debug, Clone, Deserialize)]
pub struct ClickResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Parameters of `/json/stations/search`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationQuery {
    pub name: Option<String>,
    pub countrycode: Option<String>,
    pub tag: Option<String>,
    pub limit: usize,
    /// Sort by popularity, most clicked first
    pub by_popularity: bool,
}

impl StationQuery {
    /// Most clicked stations, optionally restricted to a country or tag
    pub fn top(limit: usize) -> Self {
        Self {
            limit,
            by_popularity: true,
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>, limit: usize) -> Self {
        Self {
            name: Some(name.into()),
            limit,
            by_popularity: true,
            ..Default::default()
        }
    }

    pub fn countrycode(mut self, code: Option<String>) -> Self {
        self.countrycode = code.filter(|c| !c.is_empty());
        self
    }

    pub fn tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag.filter(|t| !t.is_empty());
        self
    }

    /// Query string pairs, in a stable order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(code) = &self.countrycode {
            pairs.push(("countrycode", code.to_uppercase()));
        }
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.clone()));
        }
        pairs.push(("limit", self.limit.to_string()));
        if self.by_popularity {
            pairs.push(("order", "clickcount".to_string()));
            pairs.push(("reverse", "true".to_string()));
        }
        pairs.push(("hidebroken", "true".to_string()));
        pairs
    }
}
