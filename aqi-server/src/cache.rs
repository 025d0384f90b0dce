//! Caching layer for the station feed.
//!
//! The CPCB feed updates hourly and is a few hundred kilobytes of XML, so
//! every query shares one parsed snapshot. Concurrent callers that arrive
//! while the snapshot is missing or expired share a single upstream fetch
//! instead of each starting their own.
//!
//! When a refresh fails the default is to surface the error: readings are
//! safety-relevant and a sustained outage should not silently turn into
//! hours-old data. [`StalePolicy::ServeStale`] opts into returning the last
//! good snapshot instead.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache as MokaCache;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::FeedSnapshot;
use crate::feed::{FeedError, FeedSource, parse_feed};

/// The feed is a single document, so the cache holds at most one entry.
const SNAPSHOT_KEY: &str = "cpcb";

/// What to do when a refresh fails but an older snapshot exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Propagate the refresh error.
    #[default]
    SurfaceError,
    /// Return the last good snapshot and log a warning.
    ServeStale,
}

/// Configuration for the feed cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a snapshot is served before refetching.
    pub ttl: Duration,

    /// Behaviour when a refresh fails.
    pub stale_policy: StalePolicy,
}

impl CacheConfig {
    /// Set the freshness window.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the stale-data policy.
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            stale_policy: StalePolicy::SurfaceError,
        }
    }
}

/// Feed source with a single-flight snapshot cache.
pub struct FeedCache<S> {
    source: S,

    /// Current snapshot; expires after the configured TTL.
    snapshots: MokaCache<&'static str, Arc<FeedSnapshot>>,

    /// Most recent successfully parsed snapshot, kept past expiry for
    /// [`StalePolicy::ServeStale`].
    last_good: RwLock<Option<Arc<FeedSnapshot>>>,

    stale_policy: StalePolicy,
}

impl<S: FeedSource> FeedCache<S> {
    /// Create a new, empty cache in front of `source`.
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let snapshots = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Self {
            source,
            snapshots,
            last_good: RwLock::new(None),
            stale_policy: config.stale_policy,
        }
    }

    /// Get the current snapshot, fetching it if missing or expired.
    ///
    /// At most one fetch is in flight at a time; other callers wait for it
    /// and share its result (including its error).
    pub async fn snapshot(&self) -> Result<Arc<FeedSnapshot>, FeedError> {
        let result = self
            .snapshots
            .try_get_with(SNAPSHOT_KEY, self.refresh())
            .await;

        match result {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                let err = FeedError::clone(&err);
                if self.stale_policy == StalePolicy::ServeStale
                    && let Some(stale) = self.last_good.read().await.clone()
                {
                    warn!(
                        error = %err,
                        fetched_at = %stale.fetched_at,
                        "feed refresh failed, serving stale snapshot"
                    );
                    return Ok(stale);
                }
                Err(err)
            }
        }
    }

    /// Fetch and parse the feed, recording it as the last good snapshot.
    async fn refresh(&self) -> Result<Arc<FeedSnapshot>, FeedError> {
        info!("fetching station feed");

        let xml = self.source.fetch().await?;
        let snapshot = Arc::new(parse_feed(&xml, Utc::now())?);

        *self.last_good.write().await = Some(Arc::clone(&snapshot));

        info!(
            stations = snapshot.len(),
            complete = snapshot.complete_stations().count(),
            "station feed refreshed"
        );

        Ok(snapshot)
    }

    /// The cached snapshot, if present and fresh. Never fetches.
    pub async fn cached(&self) -> Option<Arc<FeedSnapshot>> {
        self.snapshots.get(SNAPSHOT_KEY).await
    }

    /// Drop the cached snapshot so the next call refetches.
    ///
    /// The last good snapshot is kept for [`StalePolicy::ServeStale`].
    pub fn invalidate(&self) {
        self.snapshots.invalidate_all();
    }

    /// Access the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FEED: &str = r#"<AqIndex><Country id="India"><State id="Delhi"><City id="Delhi">
        <Station id="A" latitude="28.6" longitude="77.2"><Air_Quality_Index Value="180"/></Station>
        </City></State></Country></AqIndex>"#;

    /// Feed source stub that counts fetches and can start failing.
    struct CountingSource {
        calls: AtomicUsize,
        /// Fetches after this many successes fail.
        succeed_times: usize,
        delay: Duration,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                succeed_times: usize::MAX,
                delay: Duration::ZERO,
            }
        }

        fn failing_after(succeed_times: usize) -> Self {
            Self {
                succeed_times,
                ..Self::new()
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FeedSource for CountingSource {
        async fn fetch(&self) -> Result<String, FeedError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if n >= self.succeed_times {
                return Err(FeedError::Api {
                    status: 503,
                    message: "down".into(),
                });
            }
            Ok(FEED.to_string())
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.stale_policy, StalePolicy::SurfaceError);
    }

    #[tokio::test]
    async fn consecutive_calls_fetch_once() {
        let cache = FeedCache::new(CountingSource::new(), &CacheConfig::default());

        let first = cache.snapshot().await.unwrap();
        let second = cache.snapshot().await.unwrap();

        assert_eq!(cache.source().calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let source = CountingSource::new().with_delay(Duration::from_millis(50));
        let cache = FeedCache::new(source, &CacheConfig::default());

        let results = futures::future::join_all((0..8).map(|_| cache.snapshot())).await;

        assert_eq!(cache.source().calls(), 1);
        for result in &results {
            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn expired_snapshot_is_refetched() {
        let config = CacheConfig::default().with_ttl(Duration::from_millis(50));
        let cache = FeedCache::new(CountingSource::new(), &config);

        cache.snapshot().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.snapshot().await.unwrap();

        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = FeedCache::new(CountingSource::new(), &CacheConfig::default());

        cache.snapshot().await.unwrap();
        assert!(cache.cached().await.is_some());

        cache.invalidate();
        assert!(cache.cached().await.is_none());

        cache.snapshot().await.unwrap();
        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test]
    async fn failure_without_cache_is_error() {
        let cache = FeedCache::new(CountingSource::failing_after(0), &CacheConfig::default());

        let err = cache.snapshot().await.unwrap_err();
        assert!(matches!(err, FeedError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = FeedCache::new(CountingSource::failing_after(0), &CacheConfig::default());

        assert!(cache.snapshot().await.is_err());
        assert!(cache.snapshot().await.is_err());
        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test]
    async fn surface_error_policy_ignores_stale_snapshot() {
        let config = CacheConfig::default().with_ttl(Duration::from_millis(50));
        let cache = FeedCache::new(CountingSource::failing_after(1), &config);

        cache.snapshot().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn serve_stale_policy_returns_last_good_snapshot() {
        let config = CacheConfig::default()
            .with_ttl(Duration::from_millis(50))
            .with_stale_policy(StalePolicy::ServeStale);
        let cache = FeedCache::new(CountingSource::failing_after(1), &config);

        let fresh = cache.snapshot().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        let stale = cache.snapshot().await.unwrap();

        assert!(Arc::ptr_eq(&fresh, &stale));
        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test]
    async fn malformed_feed_surfaces_as_malformed() {
        struct BadSource;
        impl FeedSource for BadSource {
            async fn fetch(&self) -> Result<String, FeedError> {
                Ok("<AqIndex></AqIndex>".to_string())
            }
        }

        let cache = FeedCache::new(BadSource, &CacheConfig::default());
        assert!(cache.snapshot().await.unwrap_err().is_malformed());
    }
}
