mod commands;
mod output;
mod sources;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{App, FavAction, ListArgs};
use ondesconfig::Config;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ondes", version, about = "Ondes: internet radio from many catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory (defaults to $ONDES_CONFIG, ./.ondes, then ~/.ondes)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG and the config
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the known sources and their state
    Sources,
    /// List channels from every enabled source
    List(ListArgs),
    /// Genre tags with their channel counts
    Genres,
    /// Search channels by name, genre or description
    Search { query: String },
    /// What a channel is playing right now
    Now { id: String },
    /// Print the stream URL of a channel and remember it
    Play {
        /// Channel id; the last played channel when omitted
        id: Option<String>,
    },
    /// Manage favorite channels
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },
    /// Recently played channels
    Recent {
        /// Forget the recently played channels
        #[arg(long)]
        clear: bool,
    },
    /// Check that streams answer
    Health {
        /// Channel ids; the favorites when omitted
        ids: Vec<String>,
        /// Keep checking every SECS seconds (the configured interval without a value)
        #[arg(long, value_name = "SECS", num_args = 0..=1)]
        watch: Option<Option<u64>>,
    },
}

/// Logs go to stderr: --log-level, then RUST_LOG, then host.logger.min_level
fn init_logging(cli: &Cli, config: &Config) {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.get_log_min_level().to_lowercase())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Arc::new(Config::load_config(cli.config_dir.as_deref().unwrap_or(""))?);
    init_logging(&cli, &config);
    tracing::debug!(config_dir = %config.directory(), "Configuration loaded");

    let registry = sources::build_registry(&config).await?;
    let app = App {
        config,
        registry,
        json: cli.json,
    };

    match cli.command {
        Commands::Sources => commands::list_sources(&app).await,
        Commands::List(args) => commands::list(&app, args).await,
        Commands::Genres => commands::genres(&app).await,
        Commands::Search { query } => commands::search(&app, &query).await,
        Commands::Now { id } => commands::now(&app, &id).await,
        Commands::Play { id } => commands::play(&app, id).await,
        Commands::Fav { action } => commands::fav(&app, action).await,
        Commands::Recent { clear } => commands::recent(&app, clear).await,
        Commands::Health { ids, watch } => commands::health(&app, ids, watch).await,
    }
}
