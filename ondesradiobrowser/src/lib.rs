//! # ondesradiobrowser - Radio Browser adapter for Ondes
//!
//! [Radio Browser](https://www.radio-browser.info) is an open, community
//! maintained station directory. Unlike the other catalogs it is far too
//! large to list in full, so this adapter exposes the most popular stations
//! as its catalog and answers free-text searches server side.
//!
//! Resolving a stream goes through `/json/url/<uuid>`, which also counts a
//! click for the station, as the API guidelines ask.

pub mod client;
pub mod error;
pub mod models;
pub mod source;

#[cfg(feature = "ondesconfig")]
pub mod config_ext;

pub use client::{ClientBuilder, RadioBrowserClient, DEFAULT_MIRRORS};
pub use error::{Error, Result};
pub use models::{Station, StationQuery};
pub use source::RadioBrowserSource;

#[cfg(feature = "ondesconfig")]
pub use config_ext::RadioBrowserConfigExt;
