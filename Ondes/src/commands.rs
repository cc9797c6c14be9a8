//! Subcommand implementations

use crate::output;
use crate::sources::{self, ALL_SOURCES};
use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use ondesconfig::Config;
use ondessource::{
    Channel, ChannelFilter, ChannelId, HealthMonitor, LibraryConfigExt, SortOrder,
    SourceRegistry, SourcesConfigExt, StreamHealthChecker, filter,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Shared state of one invocation
pub struct App {
    pub config: Arc<Config>,
    pub registry: SourceRegistry,
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only these sources (repeatable)
    #[arg(long = "source", value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Only channels tagged with this genre
    #[arg(long)]
    pub genre: Option<String>,

    /// Free-text filter on name, description, genres and now playing
    #[arg(long)]
    pub search: Option<String>,

    /// Sort order: name, listeners (or popular), source
    #[arg(long, default_value = "name")]
    pub sort: SortOrder,

    /// Only favorite channels
    #[arg(long)]
    pub favorites: bool,

    /// Look up what each listed channel is playing
    #[arg(long)]
    pub now_playing: bool,

    /// Ignore cached catalogs
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Subcommand)]
pub enum FavAction {
    /// Add a channel to the favorites
    Add { id: String },
    /// Remove a channel from the favorites
    Remove { id: String },
    /// Flip the favorite state of a channel
    Toggle { id: String },
    /// List favorite channels
    List,
}

impl App {
    async fn catalog(&self, refresh: bool) -> Vec<Channel> {
        let report = if refresh {
            self.registry.refresh_all().await
        } else {
            self.registry.fetch_all().await
        };
        output::print_failures(&report.failures);
        sources::persist_catalogs(&self.config, &self.registry, &report).await;
        report.channels
    }

    /// Channel name from the cached catalogs, falling back to the id
    async fn display_name(&self, channel_id: &str) -> String {
        match self.registry.find_channel(channel_id).await {
            Some(channel) => channel.name,
            None => channel_id.to_string(),
        }
    }

    async fn print_id_list(&self, ids: &[String], empty: &str) -> Result<()> {
        if self.json {
            let mut entries = Vec::with_capacity(ids.len());
            for id in ids {
                entries.push(serde_json::json!({
                    "id": id,
                    "name": self.registry.find_channel(id).await.map(|c| c.name),
                }));
            }
            return output::print_json(&serde_json::Value::Array(entries));
        }

        if ids.is_empty() {
            println!("{}", empty);
        }
        for id in ids {
            println!("{:<32} {}", id, self.display_name(id).await);
        }
        Ok(())
    }
}

pub async fn list_sources(app: &App) -> Result<()> {
    let mut rows = Vec::new();
    for id in ALL_SOURCES {
        let enabled = app.config.get_source_enabled(id)?;
        let adapter = app.registry.get(id).await;
        let capabilities = adapter.as_ref().map(|s| s.capabilities()).unwrap_or_default();
        rows.push(serde_json::json!({
            "id": id,
            "name": adapter.as_ref().map(|s| s.name().to_string()),
            "enabled": enabled,
            "registered": adapter.is_some(),
            "now_playing": capabilities.supports_now_playing,
            "search": capabilities.supports_search,
            "click_reporting": capabilities.supports_click_reporting,
        }));
    }

    if app.json {
        return output::print_json(&serde_json::Value::Array(rows));
    }

    for id in ALL_SOURCES {
        let state = if !app.config.get_source_enabled(id)? {
            "disabled".to_string()
        } else if let Some(source) = app.registry.get(id).await {
            let caps = source.capabilities();
            let mut features = Vec::new();
            if caps.supports_now_playing {
                features.push("now-playing");
            }
            if caps.supports_search {
                features.push("search");
            }
            if caps.supports_click_reporting {
                features.push("click-reporting");
            }
            format!("{} ({})", source.name(), features.join(", "))
        } else {
            "failed to start".to_string()
        };
        println!("{:<14} {}", id, state);
    }
    Ok(())
}

pub async fn list(app: &App, args: ListArgs) -> Result<()> {
    let channels = app.catalog(args.refresh).await;

    let mut criteria = ChannelFilter::new();
    if let Some(query) = args.search {
        criteria = criteria.query(query);
    }
    if let Some(genre) = args.genre {
        criteria = criteria.genre(genre);
    }
    for source in args.sources {
        criteria = criteria.source(source);
    }
    if args.favorites {
        criteria = criteria.only(app.config.get_favorites()?);
    }

    let mut channels = filter::apply(&channels, &criteria, args.sort);
    if args.now_playing {
        let updated = app.registry.refresh_now_playing(&mut channels).await;
        debug!(updated, total = channels.len(), "Now playing refreshed");
    }

    output::print_channels(&channels, app.json)
}

pub async fn genres(app: &App) -> Result<()> {
    let channels = app.catalog(false).await;
    let counts = filter::genre_counts(&channels);

    if app.json {
        let rows = counts
            .iter()
            .map(|(genre, count)| serde_json::json!({ "genre": genre, "channels": count }))
            .collect();
        return output::print_json(&serde_json::Value::Array(rows));
    }

    for (genre, count) in counts {
        println!("{:<24} {}", genre, count);
    }
    Ok(())
}

/// Append `extra` to `channels`, skipping ids already present
fn merge_unique(mut channels: Vec<Channel>, extra: Vec<Channel>) -> Vec<Channel> {
    let mut seen: HashSet<String> = channels.iter().map(|c| c.id.clone()).collect();
    for channel in extra {
        if seen.insert(channel.id.clone()) {
            channels.push(channel);
        }
    }
    channels
}

/// Search the merged catalog, then the sources offering server-side search
pub async fn search(app: &App, query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Empty search query");
    }

    let catalog = app.catalog(false).await;
    let local = filter::apply(&catalog, &ChannelFilter::new().query(query), SortOrder::Name);

    let remote = app.registry.search(query).await;
    output::print_failures(&remote.failures);
    info!(local = local.len(), remote = remote.channels.len(), "Search done");

    output::print_channels(&merge_unique(local, remote.channels), app.json)
}

pub async fn now(app: &App, channel_id: &str) -> Result<()> {
    ChannelId::parse(channel_id)?;
    let np = app
        .registry
        .now_playing(channel_id)
        .await
        .with_context(|| format!("Now playing lookup failed for {}", channel_id))?;
    output::print_now_playing(channel_id, np.as_ref(), app.json)
}

/// Resolve the stream URL of a channel and record the play
///
/// Without an id, the last played channel is used.
pub async fn play(app: &App, channel_id: Option<String>) -> Result<()> {
    let channel_id = match channel_id {
        Some(id) => id,
        None => app
            .config
            .get_last_channel()?
            .context("No channel given and nothing played yet")?,
    };
    ChannelId::parse(&channel_id)?;

    let url = app
        .registry
        .stream_url(&channel_id)
        .await
        .with_context(|| format!("Cannot resolve stream for {}", channel_id))?;

    app.config.push_recent(&channel_id)?;
    app.config.set_last_channel(&channel_id)?;
    info!(channel_id = %channel_id, url = %url, "Playing");

    if app.json {
        return output::print_json(&serde_json::json!({
            "id": channel_id,
            "name": app.registry.find_channel(&channel_id).await.map(|c| c.name),
            "stream_url": url,
        }));
    }
    println!("{}", url);
    Ok(())
}

pub async fn fav(app: &App, action: FavAction) -> Result<()> {
    let (id, message) = match action {
        FavAction::List => {
            let favorites = app.config.get_favorites()?;
            return app.print_id_list(&favorites, "No favorites.").await;
        }
        FavAction::Add { id } => {
            ChannelId::parse(&id)?;
            let added = app.config.add_favorite(&id)?;
            let message = if added { "added to favorites" } else { "already a favorite" };
            (id, message)
        }
        FavAction::Remove { id } => {
            let removed = app.config.remove_favorite(&id)?;
            let message = if removed { "removed from favorites" } else { "not a favorite" };
            (id, message)
        }
        FavAction::Toggle { id } => {
            ChannelId::parse(&id)?;
            let now_favorite = app.config.toggle_favorite(&id)?;
            let message = if now_favorite { "added to favorites" } else { "removed from favorites" };
            (id, message)
        }
    };

    if app.json {
        return output::print_json(&serde_json::json!({
            "id": id,
            "favorite": app.config.is_favorite(&id)?,
        }));
    }
    println!("{}: {}", app.display_name(&id).await, message);
    Ok(())
}

pub async fn recent(app: &App, clear: bool) -> Result<()> {
    if clear {
        app.config.clear_recent()?;
        if !app.json {
            println!("Recently played list cleared.");
        }
        return Ok(());
    }

    let recent = app.config.get_recent_channels()?;
    app.print_id_list(&recent, "Nothing played yet.").await
}

/// `(channel id, stream url)` pairs for the given ids, or the favorites
async fn health_targets(app: &App, ids: Vec<String>) -> Result<Vec<(String, String)>> {
    let ids = if ids.is_empty() {
        app.config.get_favorites()?
    } else {
        ids
    };
    if ids.is_empty() {
        bail!("No channel given and no favorites to check");
    }

    let mut targets = Vec::with_capacity(ids.len());
    for id in ids {
        let parsed = ChannelId::parse(&id)?;
        let channel = match app.registry.find_channel(&id).await {
            Some(channel) => Some(channel),
            None => app
                .registry
                .fetch_source(&parsed.source)
                .await
                .with_context(|| format!("Cannot load the {} catalog", parsed.source))?
                .into_iter()
                .find(|c| c.id == id),
        };
        let channel = channel.with_context(|| format!("Unknown channel {}", id))?;
        targets.push((channel.id, channel.stream_url));
    }
    Ok(targets)
}

/// Check stream URLs once, or keep polling them with `watch`
///
/// `watch` is `Some(None)` for the configured interval.
pub async fn health(app: &App, ids: Vec<String>, watch: Option<Option<u64>>) -> Result<()> {
    let targets = health_targets(app, ids).await?;
    let timeout = Duration::from_secs(app.config.get_http_timeout_secs()?);
    let checker = StreamHealthChecker::new(&app.config.get_user_agent(), timeout)?;

    let Some(interval) = watch else {
        let results = checker.check_all(&targets).await;
        return output::print_health(&results, app.json);
    };

    let secs = match interval {
        Some(secs) if secs > 0 => secs,
        _ => app.config.get_health_interval_secs()?,
    };
    let monitor = HealthMonitor::spawn(checker, targets, Duration::from_secs(secs));
    let mut updates = monitor.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                output::print_health(&snapshot, app.json)?;
                if !app.json {
                    println!();
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    monitor.shutdown().await;
    Ok(())
}
