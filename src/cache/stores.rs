use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::Store;

/// Consider the store list fresh for 5 minutes.
/// Long enough to absorb screen changes, short enough that a newly
/// opened store shows up without restarting the app.
const STORE_FRESH_MINUTES: i64 = 5;

/// A cached value with its fetch time.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_fresh(&self) -> bool {
        Utc::now() - self.fetched_at < Duration::minutes(STORE_FRESH_MINUTES)
    }

    pub fn age_display(&self) -> String {
        let minutes = (Utc::now() - self.fetched_at).num_minutes();
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else {
            format!("{}h ago", minutes / 60)
        }
    }
}

/// Where store rows come from. The seam exists so tests can count
/// remote calls; `ApiClient` is the production implementation.
#[async_trait]
pub trait StoreSource: Send + Sync {
    async fn fetch_stores(&self) -> anyhow::Result<Vec<Store>>;
}

/// Fetch results are shared between coalesced callers, so the error
/// side must be `Clone`; the classified display string is what every
/// consumer wants anyway.
pub type StoreResult = Result<Vec<Store>, String>;

type InflightFetch = Shared<BoxFuture<'static, StoreResult>>;

struct DirectoryState {
    cache: Option<CacheEntry<Vec<Store>>>,
    inflight: Option<(u64, InflightFetch)>,
    generation: u64,
}

/// Process-wide store directory.
///
/// One instance is created after sign-in and handed to every consumer
/// behind an `Arc`. Concurrent `get` calls while a fetch is in flight
/// attach to the same future instead of issuing a second request, so
/// there is at most one outstanding store-list fetch at any time.
pub struct StoreDirectory {
    source: Arc<dyn StoreSource>,
    state: Mutex<DirectoryState>,
}

impl StoreDirectory {
    pub fn new(source: Arc<dyn StoreSource>) -> Self {
        Self {
            source,
            state: Mutex::new(DirectoryState {
                cache: None,
                inflight: None,
                generation: 0,
            }),
        }
    }

    /// Get the store list. Fresh cache hits return without a network
    /// call; `force` bypasses the freshness check. Failures leave any
    /// previous (possibly stale) entry untouched and readable via
    /// `cached()`, but are not retried automatically.
    pub async fn get(&self, force: bool) -> StoreResult {
        let (fetch, my_generation) = {
            let mut state = self.state.lock().await;

            if !force {
                if let Some(entry) = &state.cache {
                    if entry.is_fresh() {
                        debug!(count = entry.data.len(), "Serving store list from cache");
                        return Ok(entry.data.clone());
                    }
                }
            }

            if let Some((generation, inflight)) = &state.inflight {
                debug!("Joining in-flight store fetch");
                (inflight.clone(), *generation)
            } else {
                state.generation += 1;
                let generation = state.generation;
                let source = Arc::clone(&self.source);
                let fetch = async move {
                    source
                        .fetch_stores()
                        .await
                        .map_err(|e| format!("Failed to load stores: {:#}", e))
                }
                .boxed()
                .shared();
                state.inflight = Some((generation, fetch.clone()));
                (fetch, generation)
            }
        };

        let result = fetch.await;

        let mut state = self.state.lock().await;
        // Only the fetch generation we awaited may settle the shared
        // state; a late waiter must not clobber a newer in-flight fetch.
        if state.inflight.as_ref().map(|(g, _)| *g) == Some(my_generation) {
            state.inflight = None;
            match &result {
                Ok(stores) => {
                    state.cache = Some(CacheEntry::new(stores.clone()));
                }
                Err(message) => {
                    warn!(error = %message, "Store fetch failed, keeping previous cache");
                }
            }
        }

        result
    }

    /// Force a fetch regardless of freshness.
    pub async fn refetch(&self) -> StoreResult {
        self.get(true).await
    }

    /// Drop the cached entry; the next `get` goes to the network.
    pub async fn invalidate(&self) {
        self.state.lock().await.cache = None;
    }

    /// The current entry, fresh or stale, for age display.
    pub async fn cached(&self) -> Option<CacheEntry<Vec<Store>>> {
        self.state.lock().await.cache.clone()
    }

    #[cfg(test)]
    async fn backdate_cache(&self, by: Duration) {
        if let Some(entry) = self.state.lock().await.cache.as_mut() {
            entry.fetched_at = entry.fetched_at - by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail_from_call: Option<usize>,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_from_call: None,
            }
        }

        fn failing_from(call: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_from_call: Some(call),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StoreSource for CountingSource {
        async fn fetch_stores(&self) -> anyhow::Result<Vec<Store>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            // Hold the fetch open long enough for callers to overlap
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if self.fail_from_call.is_some_and(|n| call >= n) {
                anyhow::bail!("store backend unavailable");
            }
            Ok(vec![
                Store { id: "S1".to_string(), name: "Shibuya".to_string() },
                Store { id: "S2".to_string(), name: "Ebisu".to_string() },
            ])
        }
    }

    fn directory(source: Arc<CountingSource>) -> StoreDirectory {
        StoreDirectory::new(source)
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let source = Arc::new(CountingSource::new());
        let dir = directory(Arc::clone(&source));

        let (a, b) = tokio::join!(dir.get(false), dir.get(false));
        assert_eq!(a.unwrap().len(), 2);
        assert_eq!(b.unwrap().len(), 2);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fresh_cache_serves_without_fetch() {
        let source = Arc::new(CountingSource::new());
        let dir = directory(Arc::clone(&source));

        dir.get(false).await.unwrap();
        dir.get(false).await.unwrap();
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_triggers_new_fetch() {
        let source = Arc::new(CountingSource::new());
        let dir = directory(Arc::clone(&source));

        dir.get(false).await.unwrap();
        // One millisecond past the freshness window
        dir.backdate_cache(Duration::minutes(5) + Duration::milliseconds(1))
            .await;
        dir.get(false).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_just_inside_window_still_cached() {
        let source = Arc::new(CountingSource::new());
        let dir = directory(Arc::clone(&source));

        dir.get(false).await.unwrap();
        dir.backdate_cache(Duration::minutes(4) + Duration::seconds(59))
            .await;
        dir.get(false).await.unwrap();
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_force_bypasses_freshness() {
        let source = Arc::new(CountingSource::new());
        let dir = directory(Arc::clone(&source));

        dir.get(false).await.unwrap();
        dir.get(true).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_cache_readable() {
        let source = Arc::new(CountingSource::failing_from(2));
        let dir = directory(Arc::clone(&source));

        dir.get(false).await.unwrap();
        dir.backdate_cache(Duration::minutes(6)).await;

        let err = dir.get(false).await.unwrap_err();
        assert!(err.contains("store backend unavailable"));

        // The stale entry survives for readers, and the failed fetch is
        // not retried on its own.
        let entry = dir.cached().await.expect("stale entry kept");
        assert_eq!(entry.data.len(), 2);
        assert!(!entry.is_fresh());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_next_fetch() {
        let source = Arc::new(CountingSource::new());
        let dir = directory(Arc::clone(&source));

        dir.get(false).await.unwrap();
        dir.invalidate().await;
        assert!(dir.cached().await.is_none());
        dir.get(false).await.unwrap();
        assert_eq!(source.call_count(), 2);
    }
}
