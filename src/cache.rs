use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::config::schema::MergedConfig;

/// Lifetime of entries stored with [`ConfigCache::set`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

static GLOBAL_CACHE: LazyLock<Arc<ConfigCache>> = LazyLock::new(|| Arc::new(ConfigCache::new()));

#[derive(Debug, Clone)]
struct CacheEntry {
    data: MergedConfig,
    timestamp: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.timestamp) > self.ttl
    }
}

/// Snapshot returned by [`ConfigCache::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
    /// Rough size of keys plus serialized values.
    pub memory_estimate_bytes: usize,
}

/// In-memory store of merged configs keyed by config file paths.
///
/// Expired entries are evicted lazily on `get` or in bulk by `cleanup`.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide shared cache.
    pub fn global() -> Arc<ConfigCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// `<app>:<user>`, or just `<app>` when there is no user file.
    pub fn create_key(app_path: &str, user_path: Option<&str>) -> String {
        match user_path {
            Some(user_path) => format!("{app_path}:{user_path}"),
            None => app_path.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<MergedConfig> {
        let mut entries = self.lock();
        let expired = entries.get(key)?.is_expired(Instant::now());
        if expired {
            entries.remove(key);
            debug!(key, "Cache entry expired");
            return None;
        }
        entries.get(key).map(|entry| entry.data.clone())
    }

    pub fn set(&self, key: impl Into<String>, data: MergedConfig) {
        self.set_with_ttl(key, data, DEFAULT_TTL);
    }

    pub fn set_with_ttl(&self, key: impl Into<String>, data: MergedConfig, ttl: Duration) {
        let key = key.into();
        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Caching merged config");
        self.lock().insert(
            key,
            CacheEntry {
                data,
                timestamp: Instant::now(),
                ttl,
            },
        );
    }

    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop every expired entry and return how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Removed expired cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        let memory_estimate_bytes = entries
            .iter()
            .map(|(key, entry)| {
                key.len()
                    + serde_json::to_string(&entry.data)
                        .map(|json| json.len())
                        .unwrap_or(0)
            })
            .sum();
        CacheStats {
            size: entries.len(),
            keys,
            memory_estimate_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BaseDirConfig;

    fn merged(working_dir: &str) -> MergedConfig {
        MergedConfig {
            working_dir: working_dir.to_string(),
            app_prompt: BaseDirConfig::new("./p"),
            app_schema: BaseDirConfig::new("./s"),
            custom: Default::default(),
        }
    }

    #[test]
    fn test_key_defaults_user_part() {
        assert_eq!(ConfigCache::create_key("a.yml", None), "a.yml");
        assert_eq!(ConfigCache::create_key("a.yml", Some("u.yml")), "a.yml:u.yml");
    }

    #[test]
    fn test_set_then_get_returns_copy() {
        let cache = ConfigCache::new();
        cache.set("k", merged("./work"));
        assert_eq!(cache.get("k").unwrap().working_dir, "./work");
        assert_eq!(cache.len(), 1);
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn test_zero_ttl_expires_after_any_delay() {
        let cache = ConfigCache::new();
        cache.set_with_ttl("k", merged("./work"), Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let cache = ConfigCache::new();
        cache.set_with_ttl("old", merged("./a"), Duration::ZERO);
        cache.set("fresh", merged("./b"));
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(cache.cleanup(), 1);
        assert_eq!(cache.stats().keys, vec!["fresh".to_string()]);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = ConfigCache::new();
        cache.set("a", merged("./a"));
        cache.set("b", merged("./b"));
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        cache.clear();
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_stats_estimate_counts_keys_and_values() {
        let cache = ConfigCache::new();
        assert_eq!(cache.stats().memory_estimate_bytes, 0);
        cache.set("key", merged("./work"));
        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert!(stats.memory_estimate_bytes > "key".len());
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&ConfigCache::global(), &ConfigCache::global()));
    }
}
