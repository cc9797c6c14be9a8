//! Registry assembly from the configuration

use anyhow::{Result, bail};
use ondesconfig::Config;
use ondeskexp::{KexpClient, KexpSource};
use ondesnts::{NtsClient, NtsSource};
use ondesparadise::{RadioParadiseClient, RadioParadiseSource};
use ondesradiobrowser::{RadioBrowserClient, RadioBrowserConfigExt, RadioBrowserSource};
use ondessomafm::{SomaFmClient, SomaFmSource};
use ondessource::{Channel, FetchReport, SourceAdapter, SourceRegistry, SourcesConfigExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Every adapter Ondes knows about, in registration order
pub const ALL_SOURCES: [&str; 5] = [
    ondessomafm::source::SOURCE_ID,
    ondesparadise::source::SOURCE_ID,
    ondesnts::source::SOURCE_ID,
    ondeskexp::source::SOURCE_ID,
    ondesradiobrowser::source::SOURCE_ID,
];

async fn build_source(
    id: &str,
    config: &Config,
    user_agent: &str,
    timeout: Duration,
) -> Result<Arc<dyn SourceAdapter>> {
    let source: Arc<dyn SourceAdapter> = match id {
        ondessomafm::source::SOURCE_ID => {
            let client = SomaFmClient::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .await?;
            Arc::new(SomaFmSource::new(client))
        }
        ondesparadise::source::SOURCE_ID => {
            let client = RadioParadiseClient::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .await?;
            Arc::new(RadioParadiseSource::new(client))
        }
        ondesnts::source::SOURCE_ID => {
            let client = NtsClient::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .await?;
            Arc::new(NtsSource::new(client))
        }
        ondeskexp::source::SOURCE_ID => {
            let client = KexpClient::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .await?;
            Arc::new(KexpSource::new(client))
        }
        ondesradiobrowser::source::SOURCE_ID => {
            let mut builder = RadioBrowserClient::builder()
                .user_agent(user_agent)
                .timeout(timeout);
            if let Some(url) = config.get_radiobrowser_base_url()? {
                builder = builder.base_url(url);
            }
            let catalog = config.get_radiobrowser_catalog()?;
            Arc::new(RadioBrowserSource::new(builder.build().await?).with_catalog(catalog))
        }
        other => bail!("Unknown source: {}", other),
    };
    Ok(source)
}

/// Build a registry holding every enabled source
///
/// Catalogs persisted by earlier runs are seeded into the registry cache, so
/// `find_channel` works offline and a failing source still serves its last
/// known catalog.
pub async fn build_registry(config: &Config) -> Result<SourceRegistry> {
    let user_agent = config.get_user_agent();
    let http_timeout = Duration::from_secs(config.get_http_timeout_secs()?);

    let registry = SourceRegistry::new()
        .with_fetch_timeout(Duration::from_secs(config.get_fetch_timeout_secs()?))
        .with_cache_ttl(Duration::from_secs(config.get_channel_cache_ttl_secs()?))
        .with_now_playing_concurrency(config.get_now_playing_concurrency()?);

    for id in ALL_SOURCES {
        if !config.get_source_enabled(id)? {
            debug!(source_id = %id, "Source disabled in configuration");
            continue;
        }

        match build_source(id, config, &user_agent, http_timeout).await {
            Ok(source) => registry.register(source).await,
            Err(e) => warn!(source_id = %id, error = %e, "Failed to build source"),
        }
    }

    seed_registry(config, &registry).await;
    info!(sources = registry.count().await, "Source registry ready");
    Ok(registry)
}

/// Load persisted catalogs into the registry cache
///
/// A catalog persisted less than the cache TTL ago is served without
/// contacting its source.
pub async fn seed_registry(config: &Config, registry: &SourceRegistry) {
    for source in registry.list_all().await {
        match config.get_cached_channels(source.id()) {
            Ok(Some(cached)) if !cached.channels.is_empty() => {
                debug!(
                    source_id = %source.id(),
                    channels = cached.channels.len(),
                    last_updated = cached.last_updated,
                    "Seeding cached catalog"
                );
                let age = cached.age();
                registry
                    .seed_cache_with_age(source.id(), cached.channels, age)
                    .await;
            }
            Ok(_) => {}
            Err(e) => warn!(source_id = %source.id(), error = %e, "Unreadable cached catalog"),
        }
    }
}

/// Persist the catalogs of the sources that answered
///
/// Failed sources keep their previous cache. Now-playing data is not stored.
pub async fn persist_catalogs(config: &Config, registry: &SourceRegistry, report: &FetchReport) {
    let failed = report.failed_sources();

    for source in registry.list_all().await {
        let id = source.id();
        if failed.contains(&id) {
            continue;
        }

        let channels: Vec<Channel> = report
            .channels
            .iter()
            .filter(|c| c.source == id)
            .map(|c| Channel {
                now_playing: None,
                ..c.clone()
            })
            .collect();
        if channels.is_empty() {
            continue;
        }

        if let Err(e) = config.set_cached_channels(id, &channels) {
            warn!(source_id = %id, error = %e, "Failed to persist catalog");
        }
    }
}
