//! Favorites and recently played channels
//!
//! Persisted in the `library` section of the configuration file through the
//! [`LibraryConfigExt`] extension trait.

use anyhow::Result;
use ondesconfig::Config;
use serde_yaml::{Number, Value};

/// Default number of channels kept in the recently played list
pub const DEFAULT_RECENT_MAX: usize = 20;

const FAVORITES_PATH: &[&str] = &["library", "favorites"];
const RECENT_PATH: &[&str] = &["library", "recent"];
const RECENT_MAX_PATH: &[&str] = &["library", "recent_max"];
const LAST_CHANNEL_PATH: &[&str] = &["library", "last_channel"];

fn read_id_list(config: &Config, path: &[&str]) -> Result<Vec<String>> {
    match config.get_value(path) {
        Ok(Value::Sequence(seq)) => Ok(seq
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn write_id_list(config: &Config, path: &[&str], ids: &[String]) -> Result<()> {
    let seq = ids.iter().cloned().map(Value::String).collect();
    config.set_value(path, Value::Sequence(seq))
}

/// Favorites, recently played and last channel, stored in the config file
pub trait LibraryConfigExt {
    /// Favorite channel ids, in the order they were added
    fn get_favorites(&self) -> Result<Vec<String>>;

    fn is_favorite(&self, channel_id: &str) -> Result<bool>;

    /// Add a favorite; returns `false` if it already was one
    fn add_favorite(&self, channel_id: &str) -> Result<bool>;

    /// Remove a favorite; returns `false` if it was not one
    fn remove_favorite(&self, channel_id: &str) -> Result<bool>;

    /// Flip the favorite state; returns the new state
    fn toggle_favorite(&self, channel_id: &str) -> Result<bool>;

    /// Recently played channel ids, most recent first
    fn get_recent_channels(&self) -> Result<Vec<String>>;

    /// Record a play: moves the id to the front and truncates the list
    fn push_recent(&self, channel_id: &str) -> Result<()>;

    fn clear_recent(&self) -> Result<()>;

    fn get_recent_max(&self) -> Result<usize>;
    fn set_recent_max(&self, max: usize) -> Result<()>;

    fn get_last_channel(&self) -> Result<Option<String>>;
    fn set_last_channel(&self, channel_id: &str) -> Result<()>;
}

impl LibraryConfigExt for Config {
    fn get_favorites(&self) -> Result<Vec<String>> {
        read_id_list(self, FAVORITES_PATH)
    }

    fn is_favorite(&self, channel_id: &str) -> Result<bool> {
        Ok(self.get_favorites()?.iter().any(|id| id == channel_id))
    }

    fn add_favorite(&self, channel_id: &str) -> Result<bool> {
        let mut favorites = self.get_favorites()?;
        if favorites.iter().any(|id| id == channel_id) {
            return Ok(false);
        }
        favorites.push(channel_id.to_string());
        write_id_list(self, FAVORITES_PATH, &favorites)?;
        Ok(true)
    }

    fn remove_favorite(&self, channel_id: &str) -> Result<bool> {
        let mut favorites = self.get_favorites()?;
        let before = favorites.len();
        favorites.retain(|id| id != channel_id);
        if favorites.len() == before {
            return Ok(false);
        }
        write_id_list(self, FAVORITES_PATH, &favorites)?;
        Ok(true)
    }

    fn toggle_favorite(&self, channel_id: &str) -> Result<bool> {
        if self.remove_favorite(channel_id)? {
            Ok(false)
        } else {
            self.add_favorite(channel_id)
        }
    }

    fn get_recent_channels(&self) -> Result<Vec<String>> {
        read_id_list(self, RECENT_PATH)
    }

    fn push_recent(&self, channel_id: &str) -> Result<()> {
        let max = self.get_recent_max()?;
        let mut recent = self.get_recent_channels()?;
        recent.retain(|id| id != channel_id);
        recent.insert(0, channel_id.to_string());
        recent.truncate(max);
        write_id_list(self, RECENT_PATH, &recent)
    }

    fn clear_recent(&self) -> Result<()> {
        write_id_list(self, RECENT_PATH, &[])
    }

    fn get_recent_max(&self) -> Result<usize> {
        match self.get_value(RECENT_MAX_PATH) {
            Ok(Value::Number(n)) => Ok(n
                .as_u64()
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_RECENT_MAX)),
            _ => Ok(DEFAULT_RECENT_MAX),
        }
    }

    fn set_recent_max(&self, max: usize) -> Result<()> {
        self.set_value(RECENT_MAX_PATH, Value::Number(Number::from(max)))
    }

    fn get_last_channel(&self) -> Result<Option<String>> {
        match self.get_value(LAST_CHANNEL_PATH) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    fn set_last_channel(&self, channel_id: &str) -> Result<()> {
        self.set_value(LAST_CHANNEL_PATH, Value::String(channel_id.to_string()))
    }
}
