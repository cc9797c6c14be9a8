//! Extension pour intégrer Radio Browser dans ondesconfig
//!
//! Réglages sous `sources.radiobrowser` :
//!
//! ```yaml
//! sources:
//!   radiobrowser:
//!     enabled: true
//!     limit: 100
//!     base_url: https://de1.api.radio-browser.info   # optionnel
//!     countrycode: FR                                # optionnel
//!     tag: jazz                                      # optionnel
//! ```

use crate::models::StationQuery;
use crate::source::DEFAULT_LIMIT;
use anyhow::Result;
use ondesconfig::Config;
use serde_yaml::{Number, Value};

const BASE_URL_PATH: &[&str] = &["sources", "radiobrowser", "base_url"];
const LIMIT_PATH: &[&str] = &["sources", "radiobrowser", "limit"];
const COUNTRYCODE_PATH: &[&str] = &["sources", "radiobrowser", "countrycode"];
const TAG_PATH: &[&str] = &["sources", "radiobrowser", "tag"];

fn get_optional_string(config: &Config, path: &[&str]) -> Result<Option<String>> {
    match config.get_value(path) {
        Ok(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        _ => Ok(None),
    }
}

fn set_optional_string(config: &Config, path: &[&str], value: Option<String>) -> Result<()> {
    let value = value
        .filter(|s| !s.trim().is_empty())
        .map(Value::String)
        .unwrap_or(Value::Null);
    config.set_value(path, value)
}

/// Trait d'extension pour la configuration Radio Browser
pub trait RadioBrowserConfigExt {
    /// Miroir imposé ; `None` pour utiliser la liste par défaut
    fn get_radiobrowser_base_url(&self) -> Result<Option<String>>;
    fn set_radiobrowser_base_url(&self, url: Option<String>) -> Result<()>;

    /// Nombre de stations du catalogue et des recherches (défaut : 100)
    fn get_radiobrowser_limit(&self) -> Result<usize>;
    fn set_radiobrowser_limit(&self, limit: usize) -> Result<()>;

    fn get_radiobrowser_countrycode(&self) -> Result<Option<String>>;
    fn set_radiobrowser_countrycode(&self, code: Option<String>) -> Result<()>;

    fn get_radiobrowser_tag(&self) -> Result<Option<String>>;
    fn set_radiobrowser_tag(&self, tag: Option<String>) -> Result<()>;

    /// Requête du catalogue construite à partir des réglages
    fn get_radiobrowser_catalog(&self) -> Result<StationQuery> {
        Ok(StationQuery::top(self.get_radiobrowser_limit()?)
            .countrycode(self.get_radiobrowser_countrycode()?)
            .tag(self.get_radiobrowser_tag()?))
    }
}

impl RadioBrowserConfigExt for Config {
    fn get_radiobrowser_base_url(&self) -> Result<Option<String>> {
        get_optional_string(self, BASE_URL_PATH)
    }

    fn set_radiobrowser_base_url(&self, url: Option<String>) -> Result<()> {
        set_optional_string(self, BASE_URL_PATH, url)
    }

    fn get_radiobrowser_limit(&self) -> Result<usize> {
        match self.get_value(LIMIT_PATH) {
            Ok(Value::Number(n)) => match n.as_u64() {
                Some(limit) if limit > 0 => Ok(limit as usize),
                _ => Ok(DEFAULT_LIMIT),
            },
            _ => Ok(DEFAULT_LIMIT),
        }
    }

    fn set_radiobrowser_limit(&self, limit: usize) -> Result<()> {
        self.set_value(LIMIT_PATH, Value::Number(Number::from(limit)))
    }

    fn get_radiobrowser_countrycode(&self) -> Result<Option<String>> {
        get_optional_string(self, COUNTRYCODE_PATH)
    }

    fn set_radiobrowser_countrycode(&self, code: Option<String>) -> Result<()> {
        set_optional_string(self, COUNTRYCODE_PATH, code)
    }

    fn get_radiobrowser_tag(&self) -> Result<Option<String>> {
        get_optional_string(self, TAG_PATH)
    }

    fn set_radiobrowser_tag(&self, tag: Option<String>) -> Result<()> {
        set_optional_string(self, TAG_PATH, tag)
    }
}
