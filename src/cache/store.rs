//! Response storage with per-entry expiry.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::mutex_lock;
use super::{METRIC_CACHE_EVICT, METRIC_CACHE_EXPIRED};

const SOURCE: &str = "cache::store";

/// A fully buffered response that can be replayed any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.clear();
        for (name, value) in self.headers {
            headers.append(name, value);
        }

        response
    }
}

/// Request-keyed response storage with time-to-live semantics.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// A previously stored response that has not yet expired.
    async fn lookup(&self, key: &CacheKey) -> Option<CachedResponse>;

    /// Keep `response` under `key` for `ttl`.
    async fn store(&self, key: CacheKey, response: CachedResponse, ttl: Duration);
}

struct Entry {
    response: CachedResponse,
    expires_at: Instant,
}

/// In-process store: LRU-bounded, entries dropped once their TTL lapses.
pub struct MemoryResponseStore {
    entries: Mutex<LruCache<CacheKey, Entry>>,
}

impl MemoryResponseStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.max_entries)),
        }
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResponseStore for MemoryResponseStore {
    async fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "lookup");

        match entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.response.clone()),
            Some(_) => {}
            None => return None,
        }

        entries.pop(key);
        counter!(METRIC_CACHE_EXPIRED).increment(1);
        debug!(key = %key, "dropped expired response");
        None
    }

    async fn store(&self, key: CacheKey, response: CachedResponse, ttl: Duration) {
        let entry = Entry {
            response,
            expires_at: Instant::now() + ttl,
        };

        let mut entries = mutex_lock(&self.entries, SOURCE, "store");
        if let Some((evicted, _)) = entries.push(key.clone(), entry)
            && evicted != key
        {
            counter!(METRIC_CACHE_EVICT).increment(1);
            debug!(key = %evicted, "evicted least recently used response");
        }
    }
}
