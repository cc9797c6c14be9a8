//! # ondesnts - NTS Radio adapter for Ondes
//!
//! NTS broadcasts two live channels from London and a set of Infinite
//! Mixtapes, continuous curated streams without track metadata.

pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use client::{ClientBuilder, NtsClient};
pub use error::{Error, Result};
pub use models::{Broadcast, LiveChannel, LiveResponse, Mixtape};
pub use source::NtsSource;
