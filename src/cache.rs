//! Short-TTL response memoization.
//!
//! Entries expire lazily: a lookup that finds a stale entry removes it and
//! reports a miss. There is no capacity bound and no background sweep.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

pub const SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry<V> {
    data: V,
    expires_at: Instant,
}

pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let fresh = entries.get(key).map(|e| Instant::now() < e.expires_at)?;
        if !fresh {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.data.clone())
    }

    pub fn put(&self, key: String, data: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.lock().insert(key, CacheEntry { data, expires_at });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic key for a product text search. The free-text query goes last
/// so a `|` inside it cannot collide with another field.
pub fn search_key(query: &str, page: u32, page_size: u32, region: &str, base: &str) -> String {
    format!(
        "{region}|{base}|{page}|{page_size}|{}",
        query.trim().to_lowercase()
    )
}

#[cfg(test)]
mod cache_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn put_then_get_returns_value() {
        let cache = ResponseCache::new();
        cache.put("k".into(), vec![1, 2, 3], SEARCH_TTL);
        assert_eq!(cache.get("k"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("other"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_a_miss_and_removed() {
        let cache = ResponseCache::new();
        cache.put("k".into(), "v".to_string(), SEARCH_TTL);
        tokio::time::advance(SEARCH_TTL - Duration::from_secs(1)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_existing_key() {
        let cache = ResponseCache::new();
        cache.put("k".into(), 1, SEARCH_TTL);
        cache.put("k".into(), 2, SEARCH_TTL);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn search_key_normalizes_query_case() {
        let a = search_key("Leche ", 1, 20, "es", "https://es.openfoodfacts.org");
        let b = search_key("leche", 1, 20, "es", "https://es.openfoodfacts.org");
        let c = search_key("leche", 2, 20, "es", "https://es.openfoodfacts.org");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "es|https://es.openfoodfacts.org|1|20|leche");
        assert_ne!(
            search_key("leche", 1, 20, "es", "https://es.openfoodfacts.org"),
            search_key("leche", 1, 20, "world", "https://es.openfoodfacts.org")
        );
    }
}
