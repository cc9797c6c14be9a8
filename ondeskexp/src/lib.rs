//! # ondeskexp - KEXP adapter for Ondes
//!
//! One channel, the KEXP 90.3 FM simulcast. Now playing comes from the
//! public plays feed, with the show name resolved from the shows endpoint.

pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use client::{ClientBuilder, KexpClient};
pub use error::{Error, Result};
pub use models::{Play, PlayType, Show};
pub use source::KexpSource;
