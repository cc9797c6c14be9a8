//! # Source Registry - aggregation of every radio catalog
//!
//! Ce module fournit un registre centralisé des adaptateurs de sources
//! (`SourceAdapter`) et l'orchestration multi-sources :
//!
//! - **Enregistrement** : ajout/remplacement/suppression d'adaptateurs, ordre préservé
//! - **Fan-out** : récupération parallèle des catalogues avec un timeout par source
//! - **Isolation des erreurs** : une source en échec n'empêche jamais les autres de répondre
//! - **Cache** : catalogues conservés avec un TTL ; un catalogue expiré sert de repli
//! - **Routage** : `stream_url` / `now_playing` renvoyés vers l'adaptateur d'origine
//!   via le préfixe de l'identifiant de chaîne

use crate::channel::{Channel, ChannelId, NowPlaying};
use crate::{Result, SourceAdapter, SourceError};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default per-source timeout for catalog and now-playing calls
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Default lifetime of a cached catalog
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default number of concurrent now-playing requests
pub const DEFAULT_NOW_PLAYING_CONCURRENCY: usize = 8;

/// One source that failed during a fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
    /// A previously cached catalog was returned instead
    pub served_stale: bool,
}

/// Outcome of a fan-out over several sources
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchReport {
    /// Channels from every source that answered (or had a cached catalog),
    /// grouped by source in registration order
    pub channels: Vec<Channel>,
    pub failures: Vec<SourceFailure>,
}

impl FetchReport {
    /// True when every source answered
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of the sources that failed
    pub fn failed_sources(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.source.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
struct CachedChannels {
    channels: Vec<Channel>,
    /// `None` for seeded entries of unknown age, which are never fresh
    fetched_at: Option<Instant>,
}

impl CachedChannels {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at
            .map(|at| at.elapsed() < ttl)
            .unwrap_or(false)
    }
}

/// Keep the channels whose id and source both name `source`
fn owned_by(source: &str, channels: Vec<Channel>) -> Vec<Channel> {
    let prefix = format!("{}{}", source, crate::channel::ID_SEPARATOR);
    let total = channels.len();
    let kept: Vec<Channel> = channels
        .into_iter()
        .filter(|c| c.id.starts_with(&prefix) && c.source == source)
        .collect();
    if kept.len() != total {
        warn!(
            source_id = %source,
            dropped = total - kept.len(),
            "Dropped channels whose id does not match their source"
        );
    }
    kept
}

/// Registre des sources radio
///
/// Le registre maintient la liste ordonnée des adaptateurs enregistrés ainsi
/// qu'un cache de leurs catalogues.
///
/// # Thread Safety
///
/// Le registre utilise `Arc<RwLock<...>>` : il est `Clone` et peut être partagé
/// entre tâches.
///
/// # Examples
///
/// ```
/// use ondessource::{Channel, SourceRegistry};
///
/// # tokio_test::block_on(async {
/// let registry = SourceRegistry::new();
/// registry
///     .seed_cache("kexp", vec![Channel::new("kexp", "kexp", "KEXP", "https://kexp.example/live")])
///     .await;
///
/// let channel = registry.find_channel("kexp:kexp").await.unwrap();
/// assert_eq!(channel.name, "KEXP");
/// assert!(registry.fetch_all().await.channels.is_empty());
/// # });
/// ```
#[derive(Clone)]
pub struct SourceRegistry {
    sources: Arc<RwLock<Vec<Arc<dyn SourceAdapter>>>>,
    cache: Arc<RwLock<HashMap<String, CachedChannels>>>,
    fetch_timeout: Duration,
    cache_ttl: Duration,
    now_playing_concurrency: usize,
}

impl SourceRegistry {
    /// Crée un nouveau registre vide
    pub fn new() -> Self {
        Self {
            sources: Arc::new(RwLock::new(Vec::new())),
            cache: Arc::new(RwLock::new(HashMap::new())),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            now_playing_concurrency: DEFAULT_NOW_PLAYING_CONCURRENCY,
        }
    }

    /// Timeout applied to every adapter call
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Lifetime of a cached catalog
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Maximum number of concurrent now-playing requests
    pub fn with_now_playing_concurrency(mut self, concurrency: usize) -> Self {
        self.now_playing_concurrency = concurrency.max(1);
        self
    }

    // ========================================================================
    // Enregistrement
    // ========================================================================

    /// Enregistre un adaptateur
    ///
    /// Un adaptateur portant le même id est remplacé à sa position ; sinon il
    /// est ajouté en fin de liste.
    pub async fn register(&self, source: Arc<dyn SourceAdapter>) {
        let id = source.id().to_string();
        let mut sources = self.sources.write().await;

        info!(source_id = %id, source_name = %source.name(), "Registering radio source");

        if let Some(slot) = sources.iter_mut().find(|s| s.id() == id) {
            *slot = source;
        } else {
            sources.push(source);
        }
    }

    /// Récupère un adaptateur par son id
    pub async fn get(&self, id: &str) -> Option<Arc<dyn SourceAdapter>> {
        let sources = self.sources.read().await;
        sources.iter().find(|s| s.id() == id).cloned()
    }

    /// Liste les adaptateurs dans l'ordre d'enregistrement
    pub async fn list_all(&self) -> Vec<Arc<dyn SourceAdapter>> {
        self.sources.read().await.clone()
    }

    /// Nombre d'adaptateurs enregistrés
    pub async fn count(&self) -> usize {
        self.sources.read().await.len()
    }

    /// Vérifie si un adaptateur est enregistré
    pub async fn contains(&self, id: &str) -> bool {
        self.get(id).await.is_some()
    }

    /// Supprime un adaptateur et son catalogue en cache
    ///
    /// Retourne `true` si l'adaptateur existait.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut sources = self.sources.write().await;
            let before = sources.len();
            sources.retain(|s| s.id() != id);
            sources.len() != before
        };

        if removed {
            self.cache.write().await.remove(id);
            info!(source_id = %id, "Removed radio source");
        }
        removed
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// Preload a catalog of unknown age
    ///
    /// Seeded catalogs are served by [`SourceRegistry::find_channel`] and as a
    /// fallback when the source fails, but never count as fresh.
    pub async fn seed_cache(&self, source: &str, channels: Vec<Channel>) {
        self.seed(source, channels, None).await;
    }

    /// Preload a catalog fetched `age` ago, typically from the persisted
    /// channel cache
    ///
    /// The catalog counts as fresh until its age reaches the cache TTL, so a
    /// recent persisted catalog spares a network round trip.
    pub async fn seed_cache_with_age(&self, source: &str, channels: Vec<Channel>, age: Duration) {
        // checked_sub fails for ages older than the monotonic clock
        self.seed(source, channels, Instant::now().checked_sub(age)).await;
    }

    async fn seed(&self, source: &str, channels: Vec<Channel>, fetched_at: Option<Instant>) {
        debug!(
            source_id = %source,
            count = channels.len(),
            known_age = fetched_at.is_some(),
            "Seeding channel cache"
        );
        self.cache.write().await.insert(
            source.to_string(),
            CachedChannels { channels, fetched_at },
        );
    }

    /// Cached catalog for a source, fresh or not
    pub async fn cached_channels(&self, source: &str) -> Option<Vec<Channel>> {
        self.cache
            .read()
            .await
            .get(source)
            .map(|c| c.channels.clone())
    }

    /// Drop the cached catalog of one source
    pub async fn invalidate(&self, source: &str) {
        self.cache.write().await.remove(source);
    }

    /// Drop every cached catalog
    pub async fn invalidate_all(&self) {
        self.cache.write().await.clear();
    }

    async fn fresh_channels(&self, source: &str) -> Option<Vec<Channel>> {
        let cache = self.cache.read().await;
        cache
            .get(source)
            .filter(|c| c.is_fresh(self.cache_ttl))
            .map(|c| c.channels.clone())
    }

    async fn store(&self, source: &str, channels: &[Channel]) {
        self.cache.write().await.insert(
            source.to_string(),
            CachedChannels {
                channels: channels.to_vec(),
                fetched_at: Some(Instant::now()),
            },
        );
    }

    // ========================================================================
    // Fan-out
    // ========================================================================

    /// Fetch every catalog, reusing fresh cached catalogs
    pub async fn fetch_all(&self) -> FetchReport {
        self.fan_out(false).await
    }

    /// Fetch every catalog, bypassing the cache
    pub async fn refresh_all(&self) -> FetchReport {
        self.fan_out(true).await
    }

    async fn fan_out(&self, force: bool) -> FetchReport {
        let sources = self.list_all().await;
        info!(sources = sources.len(), force, "Fetching channel catalogs");

        let results = join_all(
            sources
                .iter()
                .map(|source| self.load_source(source.clone(), force)),
        )
        .await;

        let mut report = FetchReport::default();
        for (source, result) in sources.iter().zip(results) {
            let id = source.id();
            match result {
                Ok(channels) => report.channels.extend(channels),
                Err(err) => {
                    let stale = self.cached_channels(id).await;
                    warn!(
                        source_id = %id,
                        error = %err,
                        served_stale = stale.is_some(),
                        "Source fetch failed"
                    );
                    let served_stale = stale.is_some();
                    if let Some(channels) = stale {
                        report.channels.extend(channels);
                    }
                    report.failures.push(SourceFailure {
                        source: id.to_string(),
                        message: err.to_string(),
                        served_stale,
                    });
                }
            }
        }

        info!(
            channels = report.channels.len(),
            failures = report.failures.len(),
            "Channel catalogs fetched"
        );
        report
    }

    /// Fetch a single catalog, reusing a fresh cached copy
    pub async fn fetch_source(&self, id: &str) -> Result<Vec<Channel>> {
        let source = self
            .get(id)
            .await
            .ok_or_else(|| SourceError::UnknownSource(id.to_string()))?;
        self.load_source(source, false).await
    }

    /// Fetch a single catalog, bypassing the cache
    pub async fn refresh_source(&self, id: &str) -> Result<Vec<Channel>> {
        let source = self
            .get(id)
            .await
            .ok_or_else(|| SourceError::UnknownSource(id.to_string()))?;
        self.load_source(source, true).await
    }

    async fn load_source(&self, source: Arc<dyn SourceAdapter>, force: bool) -> Result<Vec<Channel>> {
        let id = source.id().to_string();

        if !force {
            if let Some(channels) = self.fresh_channels(&id).await {
                debug!(source_id = %id, count = channels.len(), "Using cached catalog");
                return Ok(channels);
            }
        }

        let started = Instant::now();
        let fetched = self
            .with_timeout(&id, source.fetch_channels())
            .await?;

        let channels = owned_by(&id, fetched);

        debug!(
            source_id = %id,
            count = channels.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Catalog fetched"
        );
        self.store(&id, &channels).await;
        Ok(channels)
    }

    async fn with_timeout<T>(&self, source: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.fetch_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(format!(
                "{} did not answer within {:?}",
                source, self.fetch_timeout
            ))),
        }
    }

    /// Server-side search on every source that supports it
    ///
    /// Failures are isolated per source, as for [`SourceRegistry::fetch_all`]
    /// (without stale fallback).
    pub async fn search(&self, query: &str) -> FetchReport {
        let query = query.trim();
        let mut report = FetchReport::default();
        if query.is_empty() {
            return report;
        }

        let sources: Vec<_> = self
            .list_all()
            .await
            .into_iter()
            .filter(|s| s.capabilities().supports_search)
            .collect();

        let results = join_all(
            sources
                .iter()
                .map(|source| self.with_timeout(source.id(), source.search(query))),
        )
        .await;

        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(channels) => report.channels.extend(owned_by(source.id(), channels)),
                Err(err) => {
                    warn!(source_id = %source.id(), error = %err, "Search failed");
                    report.failures.push(SourceFailure {
                        source: source.id().to_string(),
                        message: err.to_string(),
                        served_stale: false,
                    });
                }
            }
        }
        report
    }

    // ========================================================================
    // Routage par channel id
    // ========================================================================

    async fn route(&self, channel_id: &str) -> Result<(Arc<dyn SourceAdapter>, ChannelId)> {
        let id = ChannelId::parse(channel_id)?;
        let source = self
            .get(&id.source)
            .await
            .ok_or_else(|| SourceError::UnknownSource(id.source.clone()))?;
        Ok((source, id))
    }

    /// Look a channel up in the cached catalogs
    pub async fn find_channel(&self, channel_id: &str) -> Option<Channel> {
        let id = ChannelId::parse(channel_id).ok()?;
        let cache = self.cache.read().await;
        cache
            .get(&id.source)?
            .channels
            .iter()
            .find(|c| c.id == channel_id)
            .cloned()
    }

    /// Resolve the playable stream URL of a channel via its adapter
    pub async fn stream_url(&self, channel_id: &str) -> Result<String> {
        let (source, id) = self.route(channel_id).await?;
        debug!(channel_id = %channel_id, "Resolving stream URL");
        self.with_timeout(&id.source, source.stream_url(&id.local))
            .await
    }

    /// Live information for a channel via its adapter
    ///
    /// Sources without now-playing support answer `Ok(None)`.
    pub async fn now_playing(&self, channel_id: &str) -> Result<Option<NowPlaying>> {
        let (source, id) = self.route(channel_id).await?;
        if !source.capabilities().supports_now_playing {
            return Ok(None);
        }
        self.with_timeout(&id.source, source.now_playing(&id.local))
            .await
    }

    /// Refresh now-playing data of many channels with bounded concurrency
    ///
    /// A failing or empty answer leaves the channel's previous data untouched.
    /// Returns the number of channels updated.
    pub async fn refresh_now_playing(&self, channels: &mut [Channel]) -> usize {
        let adapters: HashMap<String, Arc<dyn SourceAdapter>> = self
            .list_all()
            .await
            .into_iter()
            .filter(|s| s.capabilities().supports_now_playing)
            .map(|s| (s.id().to_string(), s))
            .collect();

        let jobs: Vec<_> = channels
            .iter()
            .enumerate()
            .filter_map(|(index, channel)| {
                let adapter = adapters.get(&channel.source)?.clone();
                let local = channel.local_id().to_string();
                let timeout = self.fetch_timeout;
                Some(async move {
                    let result = tokio::time::timeout(timeout, adapter.now_playing(&local)).await;
                    (index, adapter, result)
                })
            })
            .collect();

        let results: Vec<_> = stream::iter(jobs)
            .buffer_unordered(self.now_playing_concurrency)
            .collect()
            .await;

        let mut updated = 0;
        for (index, adapter, result) in results {
            match result {
                Ok(Ok(Some(np))) if !np.is_empty() => {
                    channels[index].now_playing = Some(np);
                    updated += 1;
                }
                Ok(Ok(_)) => {}
                Ok(Err(err)) => {
                    debug!(
                        source_id = %adapter.id(),
                        channel_id = %channels[index].id,
                        error = %err,
                        "Now playing lookup failed"
                    );
                }
                Err(_) => {
                    debug!(
                        source_id = %adapter.id(),
                        channel_id = %channels[index].id,
                        "Now playing lookup timed out"
                    );
                }
            }
        }
        updated
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceCapabilities;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum Behavior {
        Ok,
        Fail,
        Hang,
    }

    #[derive(Debug)]
    struct TestSource {
        id: String,
        name: String,
        behavior: Behavior,
        calls: AtomicUsize,
        capabilities: SourceCapabilities,
    }

    impl TestSource {
        fn new(id: &str, behavior: Behavior) -> Self {
            Self {
                id: id.to_string(),
                name: format!("Test {}", id),
                behavior,
                calls: AtomicUsize::new(0),
                capabilities: SourceCapabilities {
                    supports_now_playing: true,
                    supports_search: true,
                    supports_click_reporting: false,
                },
            }
        }

        fn without_now_playing(mut self) -> Self {
            self.capabilities.supports_now_playing = false;
            self.capabilities.supports_search = false;
            self
        }

        async fn act<T>(&self, value: T) -> Result<T> {
            match self.behavior {
                Behavior::Ok => Ok(value),
                Behavior::Fail => Err(SourceError::SourceUnavailable(self.id.clone())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(value)
                }
            }
        }
    }

    #[async_trait::async_trait]
    impl SourceAdapter for TestSource {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> SourceCapabilities {
            self.capabilities
        }

        async fn fetch_channels(&self) -> Result<Vec<Channel>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let channels = vec![
                Channel::new(&self.id, "b", format!("{} B", self.id), "http://example.com/b"),
                Channel::new(&self.id, "a", format!("{} A", self.id), "http://example.com/a"),
                // Wrong prefix, must be dropped by the registry
                Channel::new("intruder", "x", "X", "http://example.com/x"),
            ];
            self.act(channels).await
        }

        async fn now_playing(&self, local_id: &str) -> Result<Option<NowPlaying>> {
            self.act(Some(NowPlaying {
                title: Some(format!("{} track", local_id)),
                ..Default::default()
            }))
            .await
        }

        async fn stream_url(&self, local_id: &str) -> Result<String> {
            self.act(format!("http://{}.example.com/{}", self.id, local_id))
                .await
        }

        async fn search(&self, query: &str) -> Result<Vec<Channel>> {
            self.act(vec![
                Channel::new(&self.id, query, query, "http://s"),
                Channel::new("intruder", query, query, "http://x"),
            ])
            .await
        }
    }

    fn registry() -> SourceRegistry {
        SourceRegistry::new().with_fetch_timeout(Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = registry();
        registry
            .register(Arc::new(TestSource::new("one", Behavior::Ok)))
            .await;

        let source = registry.get("one").await.unwrap();
        assert_eq!(source.id(), "one");
        assert_eq!(source.name(), "Test one");
        assert!(registry.get("two").await.is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_in_place() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("one", Behavior::Ok))).await;
        registry.register(Arc::new(TestSource::new("two", Behavior::Ok))).await;
        registry.register(Arc::new(TestSource::new("one", Behavior::Fail))).await;

        assert_eq!(registry.count().await, 2);
        let ids: Vec<String> = registry
            .list_all()
            .await
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("one", Behavior::Ok))).await;
        registry.fetch_all().await;

        assert!(registry.contains("one").await);
        assert!(registry.remove("one").await);
        assert!(!registry.contains("one").await);
        assert!(registry.cached_channels("one").await.is_none());
        assert!(!registry.remove("one").await);
    }

    #[tokio::test]
    async fn test_fetch_all_isolates_failures() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("good", Behavior::Ok))).await;
        registry.register(Arc::new(TestSource::new("bad", Behavior::Fail))).await;
        registry.register(Arc::new(TestSource::new("slow", Behavior::Hang))).await;
        registry.register(Arc::new(TestSource::new("also", Behavior::Ok))).await;

        let report = registry.fetch_all().await;

        let ids: Vec<&str> = report.channels.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["good:b", "good:a", "also:b", "also:a"]);
        assert_eq!(report.failed_sources(), vec!["bad", "slow"]);
        assert!(!report.is_complete());
        assert!(report.failures.iter().all(|f| !f.served_stale));
        assert!(report.failures[1].message.contains("did not answer"));
    }

    #[tokio::test]
    async fn test_fetch_all_uses_cache_until_refresh() {
        let registry = registry();
        let source = Arc::new(TestSource::new("one", Behavior::Ok));
        registry.register(source.clone()).await;

        registry.fetch_all().await;
        registry.fetch_all().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        registry.refresh_all().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_cache_is_refetched() {
        let registry = registry().with_cache_ttl(Duration::ZERO);
        let source = Arc::new(TestSource::new("one", Behavior::Ok));
        registry.register(source.clone()).await;

        registry.fetch_all().await;
        registry.fetch_all().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_source_serves_stale_cache() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("flaky", Behavior::Fail))).await;
        registry
            .seed_cache(
                "flaky",
                vec![Channel::new("flaky", "old", "Old", "http://old")],
            )
            .await;

        let report = registry.fetch_all().await;
        assert_eq!(report.channels.len(), 1);
        assert_eq!(report.channels[0].id, "flaky:old");
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].served_stale);
    }

    #[tokio::test]
    async fn test_fetch_source() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("one", Behavior::Ok))).await;

        let channels = registry.fetch_source("one").await.unwrap();
        assert_eq!(channels.len(), 2);
        assert!(matches!(
            registry.fetch_source("nope").await,
            Err(SourceError::UnknownSource(_))
        ));
    }

    #[tokio::test]
    async fn test_routing_by_prefix() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("one", Behavior::Ok))).await;
        registry.register(Arc::new(TestSource::new("two", Behavior::Ok))).await;

        assert_eq!(
            registry.stream_url("two:abc").await.unwrap(),
            "http://two.example.com/abc"
        );
        let np = registry.now_playing("one:xyz").await.unwrap().unwrap();
        assert_eq!(np.title.as_deref(), Some("xyz track"));

        assert!(matches!(
            registry.stream_url("three:abc").await,
            Err(SourceError::UnknownSource(_))
        ));
        assert!(matches!(
            registry.stream_url("noprefix").await,
            Err(SourceError::InvalidChannelId(_))
        ));
    }

    #[tokio::test]
    async fn test_now_playing_without_support_is_none() {
        let registry = registry();
        registry
            .register(Arc::new(TestSource::new("quiet", Behavior::Fail).without_now_playing()))
            .await;
        assert!(registry.now_playing("quiet:x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_channel() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("one", Behavior::Ok))).await;
        assert!(registry.find_channel("one:a").await.is_none());

        registry.fetch_all().await;
        let channel = registry.find_channel("one:a").await.unwrap();
        assert_eq!(channel.name, "one A");
        assert!(registry.find_channel("one:zzz").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_now_playing_keeps_previous_on_failure() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("good", Behavior::Ok))).await;
        registry.register(Arc::new(TestSource::new("bad", Behavior::Fail))).await;

        let previous = NowPlaying {
            title: Some("before".to_string()),
            ..Default::default()
        };
        let mut channels = vec![
            Channel::new("good", "a", "A", "http://a"),
            Channel::new("bad", "b", "B", "http://b").with_now_playing(Some(previous.clone())),
            Channel::new("unregistered", "c", "C", "http://c"),
        ];

        let updated = registry.refresh_now_playing(&mut channels).await;

        assert_eq!(updated, 1);
        assert_eq!(
            channels[0].now_playing.as_ref().unwrap().title.as_deref(),
            Some("a track")
        );
        assert_eq!(channels[1].now_playing, Some(previous));
        assert!(channels[2].now_playing.is_none());
    }

    #[tokio::test]
    async fn test_search_only_hits_capable_sources() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("one", Behavior::Ok))).await;
        registry
            .register(Arc::new(TestSource::new("two", Behavior::Ok).without_now_playing()))
            .await;
        registry.register(Arc::new(TestSource::new("bad", Behavior::Fail))).await;

        let report = registry.search("jazz").await;
        assert_eq!(report.channels.len(), 1);
        assert_eq!(report.channels[0].id, "one:jazz");
        assert_eq!(report.failed_sources(), vec!["bad"]);

        assert!(registry.search("   ").await.channels.is_empty());
    }

    #[tokio::test]
    async fn test_search_drops_foreign_channels() {
        let registry = registry();
        registry.register(Arc::new(TestSource::new("one", Behavior::Ok))).await;

        let report = registry.search("jazz").await;
        assert!(report.is_complete());
        assert!(report.channels.iter().all(|c| c.source == "one"));
        assert!(report.channels.iter().all(|c| !c.id.starts_with("intruder:")));
    }

    #[tokio::test]
    async fn test_recent_seed_counts_as_fresh() {
        let registry = registry();
        let source = Arc::new(TestSource::new("one", Behavior::Ok));
        registry.register(source.clone()).await;
        registry
            .seed_cache_with_age(
                "one",
                vec![Channel::new("one", "old", "Old", "http://old")],
                Duration::from_millis(10),
            )
            .await;

        let report = registry.fetch_all().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.channels.len(), 1);
        assert_eq!(report.channels[0].id, "one:old");
    }

    #[tokio::test]
    async fn test_old_seed_is_refetched() {
        let registry = registry().with_cache_ttl(Duration::from_millis(100));
        let source = Arc::new(TestSource::new("one", Behavior::Ok));
        registry.register(source.clone()).await;
        registry
            .seed_cache_with_age(
                "one",
                vec![Channel::new("one", "old", "Old", "http://old")],
                Duration::from_millis(500),
            )
            .await;

        let report = registry.fetch_all().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.channels.len(), 2);
    }

    #[tokio::test]
    async fn test_seed_without_age_is_never_fresh() {
        let registry = registry();
        let source = Arc::new(TestSource::new("one", Behavior::Ok));
        registry.register(source.clone()).await;
        registry
            .seed_cache("one", vec![Channel::new("one", "old", "Old", "http://old")])
            .await;

        registry.fetch_all().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
