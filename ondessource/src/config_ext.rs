//! Extension pour intégrer la configuration des sources dans ondesconfig
//!
//! Ce module fournit le trait `SourcesConfigExt` qui ajoute à
//! `ondesconfig::Config` les réglages communs à toutes les sources :
//!
//! - Activation/désactivation par source
//! - Timeout des requêtes, TTL du cache, concurrence du now-playing
//! - Intervalle du moniteur de santé des flux
//! - Cache persistant des catalogues (servi au démarrage, hors ligne)
//!
//! # Exemple
//!
//! ```no_run
//! use ondesconfig::get_config;
//! use ondessource::SourcesConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//!
//! if !config.get_source_enabled("nts")? {
//!     println!("NTS is disabled");
//! }
//! let timeout = config.get_fetch_timeout_secs()?;
//! # Ok(())
//! # }
//! ```

use crate::channel::Channel;
use anyhow::Result;
use ondesconfig::Config;
use serde::{Deserialize, Serialize};
use serde_yaml::{Number, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CHANNEL_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_NOW_PLAYING_CONCURRENCY: u64 = 8;
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;

/// Catalogue persisté
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCatalog {
    pub channels: Vec<Channel>,
    /// Unix timestamp
    pub last_updated: u64,
}

impl CachedCatalog {
    /// Time elapsed since the catalog was persisted, zero if the clock went back
    pub fn age(&self) -> Duration {
        Duration::from_secs(now_secs().saturating_sub(self.last_updated))
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Trait d'extension pour gérer la configuration des sources dans ondesconfig
///
/// Les getters persistent la valeur par défaut si elle n'existe pas encore,
/// comme le font les autres extensions de configuration.
pub trait SourcesConfigExt {
    /// Vérifie si une source est activée (défaut : `true`)
    fn get_source_enabled(&self, source: &str) -> Result<bool>;

    /// Active ou désactive une source
    fn set_source_enabled(&self, source: &str, enabled: bool) -> Result<()>;

    /// Timeout par source pour les appels aux catalogues, en secondes
    fn get_fetch_timeout_secs(&self) -> Result<u64>;
    fn set_fetch_timeout_secs(&self, secs: u64) -> Result<()>;

    /// Durée de vie d'un catalogue en cache mémoire, en secondes
    fn get_channel_cache_ttl_secs(&self) -> Result<u64>;
    fn set_channel_cache_ttl_secs(&self, secs: u64) -> Result<()>;

    /// Nombre de requêtes now-playing simultanées
    fn get_now_playing_concurrency(&self) -> Result<usize>;
    fn set_now_playing_concurrency(&self, concurrency: usize) -> Result<()>;

    /// Intervalle du moniteur de santé des flux, en secondes
    ///
    /// Une valeur nulle est remplacée par la valeur par défaut.
    fn get_health_interval_secs(&self) -> Result<u64>;
    fn set_health_interval_secs(&self, secs: u64) -> Result<()>;

    /// Catalogue persisté d'une source, quel que soit son âge
    fn get_cached_channels(&self, source: &str) -> Result<Option<CachedCatalog>>;

    /// Persiste le catalogue d'une source
    fn set_cached_channels(&self, source: &str, channels: &[Channel]) -> Result<()>;

    /// Efface le catalogue persisté d'une source
    fn clear_cached_channels(&self, source: &str) -> Result<()>;
}

fn get_u64_or_persist(config: &Config, path: &[&str], default: u64) -> Result<u64> {
    match config.get_value(path) {
        Ok(Value::Number(n)) if n.as_u64().is_some() => Ok(n.as_u64().unwrap_or(default)),
        _ => {
            config.set_value(path, Value::Number(Number::from(default)))?;
            Ok(default)
        }
    }
}

impl SourcesConfigExt for Config {
    fn get_source_enabled(&self, source: &str) -> Result<bool> {
        match self.get_value(&["sources", source, "enabled"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_source_enabled(source, true)?;
                Ok(true)
            }
        }
    }

    fn set_source_enabled(&self, source: &str, enabled: bool) -> Result<()> {
        self.set_value(&["sources", source, "enabled"], Value::Bool(enabled))
    }

    fn get_fetch_timeout_secs(&self) -> Result<u64> {
        get_u64_or_persist(
            self,
            &["sources", "fetch_timeout_secs"],
            DEFAULT_FETCH_TIMEOUT_SECS,
        )
    }

    fn set_fetch_timeout_secs(&self, secs: u64) -> Result<()> {
        self.set_value(
            &["sources", "fetch_timeout_secs"],
            Value::Number(Number::from(secs)),
        )
    }

    fn get_channel_cache_ttl_secs(&self) -> Result<u64> {
        get_u64_or_persist(
            self,
            &["sources", "channel_cache_ttl_secs"],
            DEFAULT_CHANNEL_CACHE_TTL_SECS,
        )
    }

    fn set_channel_cache_ttl_secs(&self, secs: u64) -> Result<()> {
        self.set_value(
            &["sources", "channel_cache_ttl_secs"],
            Value::Number(Number::from(secs)),
        )
    }

    fn get_now_playing_concurrency(&self) -> Result<usize> {
        let n = get_u64_or_persist(
            self,
            &["sources", "now_playing_concurrency"],
            DEFAULT_NOW_PLAYING_CONCURRENCY,
        )?;
        Ok((n as usize).max(1))
    }

    fn set_now_playing_concurrency(&self, concurrency: usize) -> Result<()> {
        self.set_value(
            &["sources", "now_playing_concurrency"],
            Value::Number(Number::from(concurrency)),
        )
    }

    fn get_health_interval_secs(&self) -> Result<u64> {
        let secs = get_u64_or_persist(
            self,
            &["sources", "health_interval_secs"],
            DEFAULT_HEALTH_INTERVAL_SECS,
        )?;
        if secs == 0 {
            tracing::warn!("sources.health_interval_secs is 0, using {}", DEFAULT_HEALTH_INTERVAL_SECS);
            return Ok(DEFAULT_HEALTH_INTERVAL_SECS);
        }
        Ok(secs)
    }

    fn set_health_interval_secs(&self, secs: u64) -> Result<()> {
        self.set_value(
            &["sources", "health_interval_secs"],
            Value::Number(Number::from(secs)),
        )
    }

    fn get_cached_channels(&self, source: &str) -> Result<Option<CachedCatalog>> {
        match self.get_value(&["sources", source, "channel_cache"]) {
            Ok(Value::Null) | Err(_) => Ok(None),
            Ok(value) => Ok(Some(serde_yaml::from_value(value)?)),
        }
    }

    fn set_cached_channels(&self, source: &str, channels: &[Channel]) -> Result<()> {
        let cached = CachedCatalog {
            channels: channels.to_vec(),
            last_updated: now_secs(),
        };
        let value = serde_yaml::to_value(&cached)?;
        self.set_value(&["sources", source, "channel_cache"], value)
    }

    fn clear_cached_channels(&self, source: &str) -> Result<()> {
        self.set_value(&["sources", source, "channel_cache"], Value::Null)
    }
}
