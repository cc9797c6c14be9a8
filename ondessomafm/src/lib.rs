//! # ondessomafm - SomaFM adapter for Ondes
//!
//! SomaFM publishes its whole catalog in a single `channels.json` document
//! and the recent playlist of each channel in `songs/<id>.json`.
//!
//! ```no_run
//! use ondessomafm::SomaFmClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SomaFmClient::new().await?;
//!     for channel in client.channels().await? {
//!         println!("{}: {}", channel.id, channel.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use client::{ClientBuilder, SomaFmClient};
pub use error::{Error, Result};
pub use models::{Playlist, SomaChannel, Song};
pub use source::SomaFmSource;
