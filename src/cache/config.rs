//! Cache configuration.

use std::num::NonZeroUsize;

const DEFAULT_MAX_ENTRIES: usize = 64;
const DEFAULT_BODY_LIMIT_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve and store through the gate at all.
    pub enabled: bool,
    /// Maximum responses kept before LRU eviction.
    pub max_entries: NonZeroUsize,
    /// Responses with larger bodies are passed through uncached.
    pub body_limit_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: NonZeroUsize::new(DEFAULT_MAX_ENTRIES).unwrap_or(NonZeroUsize::MIN),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            max_entries: settings.max_entries,
            body_limit_bytes: settings.body_limit_bytes.get(),
        }
    }
}
