//! Bounded in-memory cache with TTL and LRU eviction
//!
//! Values are stored as JSON so one cache can hold every response type.
//! Expired entries are not dropped on read; they stay available through
//! [`BoundedCache::get_stale`] until capacity pressure evicts them.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::RngExt;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::Mutex;

struct StoredEntry {
    value: Value,
    expires_at: Instant,
}

struct Inner {
    entries: HashMap<String, StoredEntry>,
    // least recently used at the front
    order: VecDeque<String>,
}

impl Inner {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn forget(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

pub struct BoundedCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl BoundedCache {
    /// A cache holding at most `capacity` entries, each fresh for `ttl`
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores a value with the default TTL, jittered by ±10%
    pub async fn put<T: Serialize + Debug>(&self, key: &str, value: &T) -> Result<()> {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        self.put_with_ttl(key, value, self.ttl.mul_f64(jitter))
            .await
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put_with_ttl<T: Serialize + Debug>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize cache entry '{key}'"))?;
        let entry = StoredEntry {
            value,
            expires_at: Instant::now() + ttl,
        };

        let mut inner = self.inner.lock().await;
        if inner.entries.insert(key.to_string(), entry).is_some() {
            inner.touch(key);
        } else {
            inner.order.push_back(key.to_string());
        }

        while inner.entries.len() > self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            tracing::debug!(key = %oldest, "Evicting least recently used entry");
            inner.entries.remove(&oldest);
        }
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.lookup(key, false).await
    }

    /// Like [`get`](Self::get) but also returns expired entries
    #[tracing::instrument(name = "query_cache_stale", level = "debug", skip(self))]
    pub async fn get_stale<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.lookup(key, true).await
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str, allow_stale: bool) -> Result<Option<T>> {
        let mut inner = self.inner.lock().await;

        let value = match inner.entries.get(key) {
            Some(entry) if allow_stale || Instant::now() < entry.expires_at => {
                tracing::debug!("Key found");
                entry.value.clone()
            }
            Some(_) => {
                tracing::debug!("Key found but expired");
                return Ok(None);
            }
            None => {
                tracing::debug!("Key not found");
                return Ok(None);
            }
        };
        inner.touch(key);
        drop(inner);

        let value = serde_json::from_value(value)
            .with_context(|| format!("Cache entry '{key}' has an unexpected shape"))?;
        Ok(Some(value))
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) {
        self.inner.lock().await.forget(key);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Debug for BoundedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
