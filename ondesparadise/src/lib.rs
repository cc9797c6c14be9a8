//! # ondesparadise - Radio Paradise adapter for Ondes
//!
//! Radio Paradise runs five listener-supported mixes. Their channel list is
//! static; live metadata comes from the `get_block` endpoint, which describes
//! the block of songs currently on air.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ondesparadise::{ParadiseChannelKind, RadioParadiseClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RadioParadiseClient::new().await?;
//!     let now_playing = client.now_playing(ParadiseChannelKind::Main).await?;
//!
//!     for (index, song) in now_playing.block.songs_ordered() {
//!         println!("  {}. {} - {} ({}s)",
//!                  index,
//!                  song.artist,
//!                  song.title,
//!                  song.duration / 1000);
//!     }
//!     Ok(())
//! }
//! ```

pub mod channels;
pub mod client;
pub mod error;
pub mod models;
pub mod source;

pub use channels::{ParadiseChannelKind, ALL_CHANNELS};
pub use client::{ClientBuilder, RadioParadiseClient};
pub use error::{Error, Result};
pub use models::{Bitrate, Block, DurationMs, EventId, NowPlaying, Song};
pub use source::RadioParadiseSource;
