//! Bounded, time-expiring response cache with LRU eviction.

use riformula_core::CacheConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Cache keys are the trimmed, lowercased input text.
pub fn normalize_key(input: &str) -> String {
    input.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted_at: Instant,
    last_access_seq: u64,
    weight: usize,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    seq: u64,
    weight_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entry_count: usize,
    pub weight_bytes: usize,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Exact-key cache over normalized input, bounded by entry count and total
/// approximate byte weight, with absolute TTL and LRU eviction.
///
/// A hit refreshes both the entry's recency and its age. Only final,
/// fully post-processed outputs may be stored. Thread-safe via Mutex.
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
    config: CacheConfig,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            config,
        }
    }

    /// Look up the cached output for `input`.
    ///
    /// Expired entries are dropped on access and count as misses.
    pub fn get(&self, input: &str) -> Option<String> {
        let key = normalize_key(input);
        let now = Instant::now();

        let Ok(mut inner) = self.inner.lock() else {
            return None;
        };
        inner.seq += 1;
        let seq = inner.seq;

        let mut hit = None;
        if let Some(entry) = inner.entries.get_mut(&key) {
            if now.duration_since(entry.inserted_at) <= self.config.ttl {
                entry.last_access_seq = seq;
                entry.inserted_at = now;
                hit = Some(entry.value.clone());
            }
        }

        match hit {
            Some(value) => {
                inner.hits += 1;
                Some(value)
            }
            None => {
                if let Some(stale) = inner.entries.remove(&key) {
                    inner.weight_bytes -= stale.weight;
                }
                inner.misses += 1;
                None
            }
        }
    }

    /// Insert a final output for `input`, evicting least-recently-used
    /// entries while either bound is exceeded.
    pub fn put(&self, input: &str, output: &str) {
        let key = normalize_key(input);
        let weight = key.len() + output.len();

        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.seq += 1;
        let seq = inner.seq;

        if let Some(previous) = inner.entries.insert(
            key,
            CacheEntry {
                value: output.to_string(),
                inserted_at: Instant::now(),
                last_access_seq: seq,
                weight,
            },
        ) {
            inner.weight_bytes -= previous.weight;
        }
        inner.weight_bytes += weight;

        while inner.entries.len() > self.config.max_entries
            || inner.weight_bytes > self.config.max_weight_bytes
        {
            let lru_key = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access_seq)
                .map(|(key, _)| key.clone());

            match lru_key {
                Some(key) => {
                    if let Some(evicted) = inner.entries.remove(&key) {
                        inner.weight_bytes -= evicted.weight;
                    }
                    inner.evictions += 1;
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
            inner.weight_bytes = 0;
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.inner
            .lock()
            .map(|inner| CacheStats {
                hits: inner.hits,
                misses: inner.misses,
                evictions: inner.evictions,
                entry_count: inner.entries.len(),
                weight_bytes: inner.weight_bytes,
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cache(max_entries: usize, max_weight: usize, ttl: Duration) -> ResponseCache {
        ResponseCache::new(CacheConfig {
            max_entries,
            max_weight_bytes: max_weight,
            ttl,
        })
    }

    #[test]
    fn test_key_normalization() {
        let cache = cache(16, 4096, Duration::from_secs(60));
        cache.put("  Presidio ZARA ", "Presidio tecnico.");
        assert_eq!(cache.get("presidio zara").unwrap(), "Presidio tecnico.");
    }

    #[test]
    fn test_miss_then_hit_statistics() {
        let cache = cache(16, 4096, Duration::from_secs(60));
        assert!(cache.get("presidio zara").is_none());
        cache.put("presidio zara", "Presidio tecnico.");
        assert!(cache.get("presidio zara").is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_lru_eviction_order() {
        let cache = cache(2, 4096, Duration::from_secs(60));
        cache.put("uno", "Primo output.");
        cache.put("due", "Secondo output.");

        // Touch "uno" so "due" becomes the least recently used.
        cache.get("uno");
        cache.put("tre", "Terzo output.");

        assert!(cache.get("uno").is_some());
        assert!(cache.get("due").is_none());
        assert!(cache.get("tre").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_weight_bound_evicts() {
        // Each entry weighs roughly 20 bytes; cap at ~2 entries by weight.
        let cache = cache(100, 45, Duration::from_secs(60));
        cache.put("chiave-a", "output lungo");
        cache.put("chiave-b", "output lungo");
        cache.put("chiave-c", "output lungo");

        assert!(cache.len() < 3);
        assert!(cache.stats().weight_bytes <= 45);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = cache(16, 4096, Duration::from_millis(30));
        cache.put("presidio zara", "Presidio tecnico.");
        assert!(cache.get("presidio zara").is_some());

        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get("presidio zara").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_refreshes_age() {
        let cache = cache(16, 4096, Duration::from_millis(80));
        cache.put("presidio zara", "Presidio tecnico.");

        // Keep touching the entry inside the TTL window; it must survive
        // past the original expiry.
        for _ in 0..3 {
            std::thread::sleep(Duration::from_millis(50));
            assert!(cache.get("presidio zara").is_some());
        }
    }

    #[test]
    fn test_overwrite_same_key_keeps_single_entry() {
        let cache = cache(16, 4096, Duration::from_secs(60));
        cache.put("presidio zara", "Prima versione.");
        cache.put("presidio zara", "Seconda versione.");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("presidio zara").unwrap(), "Seconda versione.");
    }

    #[test]
    fn test_clear_resets_contents() {
        let cache = cache(16, 4096, Duration::from_secs(60));
        cache.put("uno", "Primo.");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().weight_bytes, 0);
    }
}
