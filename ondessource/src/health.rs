//! Stream health checks
//!
//! [`StreamHealthChecker`] checks a stream URL by requesting it and looking at
//! the response headers only; the body is never read. [`HealthMonitor`] runs
//! the checker periodically in a background task and publishes snapshots on a
//! `watch` channel.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default timeout for a single check
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(8);

/// Number of checks run concurrently by the monitor
const CHECK_CONCURRENCY: usize = 8;

/// Shortest polling interval accepted by [`HealthMonitor::spawn`]
pub const MIN_MONITOR_INTERVAL: Duration = Duration::from_secs(1);

const AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/",
    "application/ogg",
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "application/aacp",
];

/// Result of probing one stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StreamHealth {
    /// The server answered with an audio stream
    Online {
        status: u16,
        content_type: Option<String>,
        latency_ms: u64,
    },
    /// The server answered, but not with something playable
    Degraded { status: u16, reason: String },
    /// No answer
    Offline { reason: String },
}

impl StreamHealth {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online { .. })
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Online { .. } => "online",
            Self::Degraded { .. } => "degraded",
            Self::Offline { .. } => "offline",
        }
    }
}

/// Checks stream URLs
#[derive(Debug, Clone)]
pub struct StreamHealthChecker {
    client: Client,
    timeout: Duration,
}

impl StreamHealthChecker {
    /// Create a checker with its own HTTP client
    pub fn new(user_agent: &str, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Create a checker sharing an existing HTTP client
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Check one URL
    pub async fn check(&self, url: &str) -> StreamHealth {
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .header("Icy-MetaData", "1")
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                debug!(url = %url, error = %err, "Stream check failed");
                let reason = if err.is_timeout() {
                    format!("no answer within {:?}", self.timeout)
                } else {
                    err.to_string()
                };
                return StreamHealth::Offline { reason };
            }
        };

        let status = response.status();
        let headers = response.headers();
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        let has_icy = headers.keys().any(|k| k.as_str().starts_with("icy-"));

        if !status.is_success() {
            return StreamHealth::Degraded {
                status: status.as_u16(),
                reason: format!("HTTP {}", status),
            };
        }

        let is_audio = has_icy
            || content_type
                .as_deref()
                .map(|ct| AUDIO_CONTENT_TYPES.iter().any(|prefix| ct.starts_with(prefix)))
                .unwrap_or(false);

        if is_audio {
            StreamHealth::Online {
                status: status.as_u16(),
                content_type,
                latency_ms: started.elapsed().as_millis() as u64,
            }
        } else {
            StreamHealth::Degraded {
                status: status.as_u16(),
                reason: format!(
                    "unexpected content type {}",
                    content_type.as_deref().unwrap_or("(none)")
                ),
            }
        }
    }

    /// Check many `(key, url)` targets with bounded concurrency
    pub async fn check_all(&self, targets: &[(String, String)]) -> HashMap<String, StreamHealth> {
        stream::iter(targets.iter().cloned())
            .map(|(key, url)| async move {
                let health = self.check(&url).await;
                (key, health)
            })
            .buffer_unordered(CHECK_CONCURRENCY)
            .collect()
            .await
    }
}

/// Background poller publishing stream health snapshots
///
/// The task stops when [`HealthMonitor::shutdown`] is called or when the
/// monitor is dropped.
pub struct HealthMonitor {
    snapshots: watch::Receiver<HashMap<String, StreamHealth>>,
    stop: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Start polling `(key, url)` targets every `interval`
    ///
    /// The first round runs immediately. Intervals shorter than
    /// [`MIN_MONITOR_INTERVAL`], zero included, are raised to it.
    pub fn spawn(
        checker: StreamHealthChecker,
        targets: Vec<(String, String)>,
        interval: Duration,
    ) -> Self {
        let interval = interval.max(MIN_MONITOR_INTERVAL);
        let (snapshot_tx, snapshot_rx) = watch::channel(HashMap::new());
        let (stop_tx, mut stop_rx) = watch::channel(false);

        info!(targets = targets.len(), interval_secs = interval.as_secs(), "Starting stream health monitor");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = checker.check_all(&targets).await;
                        let online = snapshot.values().filter(|h| h.is_online()).count();
                        debug!(online, total = snapshot.len(), "Stream health round done");
                        if snapshot_tx.send(snapshot).is_err() {
                            break;
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Stream health monitor stopped");
        });

        Self {
            snapshots: snapshot_rx,
            stop: stop_tx,
            handle: Some(handle),
        }
    }

    /// A receiver notified after every polling round
    pub fn subscribe(&self) -> watch::Receiver<HashMap<String, StreamHealth>> {
        self.snapshots.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> HashMap<String, StreamHealth> {
        self.snapshots.borrow().clone()
    }

    /// Stop the poller and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let online = StreamHealth::Online {
            status: 200,
            content_type: Some("audio/mpeg".to_string()),
            latency_ms: 12,
        };
        assert!(online.is_online());
        assert_eq!(online.label(), "online");
        assert_eq!(
            StreamHealth::Offline { reason: "x".into() }.label(),
            "offline"
        );
    }

    #[test]
    fn test_serialize_is_tagged() {
        let health = StreamHealth::Degraded {
            status: 404,
            reason: "HTTP 404 Not Found".to_string(),
        };
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["state"], "degraded");
        assert_eq!(json["status"], 404);
    }
}
