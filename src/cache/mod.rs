//! Response cache for rendered feeds.
//!
//! A single layer: the gate middleware looks a request up before routing and
//! stores fresh `200 OK` responses for the lifetime advertised in their
//! `Cache-Control: max-age`. Storage sits behind [`ResponseStore`] so the
//! in-memory LRU can be swapped out.
//!
//! ```toml
//! [cache]
//! enabled = true
//! max_age_seconds = 3600
//! max_entries = 64
//! ```

mod config;
mod gate;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use gate::{CACHE_STATUS_HEADER, CacheState, freshness_lifetime, response_cache_layer};
pub use keys::CacheKey;
pub use store::{CachedResponse, MemoryResponseStore, ResponseStore};

pub const METRIC_CACHE_HIT: &str = "hotfeed_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "hotfeed_cache_miss_total";
pub const METRIC_CACHE_STORE: &str = "hotfeed_cache_store_total";
pub const METRIC_CACHE_EXPIRED: &str = "hotfeed_cache_expired_total";
pub const METRIC_CACHE_EVICT: &str = "hotfeed_cache_evict_total";
