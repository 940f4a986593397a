//! Stale-while-revalidate cache with idle expiry.
//!
//! A hit returns the cached value immediately. When the value is older than
//! the refresh interval a background task fetches a replacement; if that
//! fetch fails the stale value stays. Entries not read for the expiry window
//! are dropped and the next read fetches synchronously. Concurrent misses on
//! the same key share one fetch.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

pub type FetchFuture<V> = Pin<Box<dyn Future<Output = Result<V>> + Send>>;

/// Loads the value for a key on a miss or a refresh.
pub type Fetcher<V> = Arc<dyn Fn(String) -> FetchFuture<V> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub refresh_after: Duration,
    pub expire_after_idle: Duration,
}

struct Entry<V> {
    value: Arc<V>,
    fetched_at: Instant,
    last_read: Instant,
    refreshing: bool,
}

struct Inner<V> {
    policy: RefreshPolicy,
    fetcher: Fetcher<V>,
    entries: DashMap<String, Entry<V>>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

pub struct RefreshingCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for RefreshingCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Send + Sync + 'static> RefreshingCache<V> {
    pub fn new(policy: RefreshPolicy, fetcher: Fetcher<V>) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                fetcher,
                entries: DashMap::new(),
                inflight: DashMap::new(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns the fetch error on a miss. Background refresh failures are
    /// only logged.
    pub async fn get(&self, key: &str) -> Result<Arc<V>> {
        if let Some(value) = self.hit(key) {
            return Ok(value);
        }

        let gate = self
            .inner
            .inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = gate.lock().await;

        // Another caller may have filled it while we waited.
        if let Some(value) = self.hit(key) {
            return Ok(value);
        }

        let fetched = (self.inner.fetcher)(key.to_string()).await;
        let result = fetched.map(|value| {
            let value = Arc::new(value);
            let now = Instant::now();
            self.inner.entries.insert(
                key.to_string(),
                Entry {
                    value: Arc::clone(&value),
                    fetched_at: now,
                    last_read: now,
                    refreshing: false,
                },
            );
            value
        });
        self.inner.inflight.remove(key);
        result
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Drop every entry that has not been read within the expiry window.
    pub fn evict_idle(&self) -> usize {
        let idle = self.inner.policy.expire_after_idle;
        let before = self.inner.entries.len();
        self.inner
            .entries
            .retain(|_, entry| entry.last_read.elapsed() < idle);
        before - self.inner.entries.len()
    }

    fn hit(&self, key: &str) -> Option<Arc<V>> {
        let policy = self.inner.policy;
        let mut entry = self.inner.entries.get_mut(key)?;
        if entry.last_read.elapsed() >= policy.expire_after_idle {
            drop(entry);
            self.inner.entries.remove(key);
            debug!(key, "Cache entry expired");
            return None;
        }
        entry.last_read = Instant::now();
        let value = Arc::clone(&entry.value);
        if entry.fetched_at.elapsed() >= policy.refresh_after && !entry.refreshing {
            entry.refreshing = true;
            drop(entry);
            self.spawn_refresh(key.to_string());
        }
        Some(value)
    }

    fn spawn_refresh(&self, key: String) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = (inner.fetcher)(key.clone()).await;
            if let Some(mut entry) = inner.entries.get_mut(&key) {
                entry.refreshing = false;
                match result {
                    Ok(value) => {
                        entry.value = Arc::new(value);
                        entry.fetched_at = Instant::now();
                    }
                    Err(e) => warn!(key = %key, error = %e, "Background refresh failed, serving stale value"),
                }
            }
        });
    }
}
