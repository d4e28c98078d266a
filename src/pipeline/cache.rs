//! Bounded LRU + TTL cache for fallback-produced replies.
//!
//! Keyed by the normalized message body. Entries expire after a hard TTL
//! regardless of access; an expired entry is treated as absent on lookup and
//! physically evicted. Only fallback replies are stored here - rule replies
//! are cheap to recompute and must reflect rule-table edits immediately.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

struct Entry {
    reply: String,
    inserted_at: Instant,
    /// Logical access stamp for LRU ordering.
    last_used: u64,
}

pub struct ResponseCache {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
            clock: 0,
        }
    }

    /// Look up a cached reply. Bumps recency on hit, evicts on expiry.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(entry) if now.duration_since(entry.inserted_at) >= self.ttl => {
                self.entries.remove(key);
                None
            }
            Some(entry) => {
                self.clock += 1;
                entry.last_used = self.clock;
                Some(entry.reply.clone())
            }
            None => None,
        }
    }

    /// Insert a reply, evicting expired entries and then the least-recently
    /// used entry if the cache is full.
    pub fn put(&mut self, key: &str, reply: &str) {
        let now = Instant::now();
        self.entries
            .retain(|_, e| now.duration_since(e.inserted_at) < self.ttl);

        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            // Capacity is small (default 100), a linear scan is fine here.
            if let Some(lru) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&lru);
            }
        }

        self.clock += 1;
        self.entries.insert(
            key.to_string(),
            Entry {
                reply: reply.to_string(),
                inserted_at: now,
                last_used: self.clock,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_hit_returns_verbatim_reply() {
        let mut cache = ResponseCache::new(10, Duration::from_secs(300));
        cache.put("how do i deploy", "Use a VPS or shared hosting.");
        assert_eq!(
            cache.get("how do i deploy").as_deref(),
            Some("Use a VPS or shared hosting.")
        );
        assert_eq!(cache.get("something else"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let mut cache = ResponseCache::new(10, Duration::from_secs(300));
        cache.put("k", "v");

        advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k"), None);
        // Expired entry was physically removed, not just hidden
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_is_hard_not_sliding() {
        let mut cache = ResponseCache::new(10, Duration::from_secs(300));
        cache.put("k", "v");

        // Repeated access must not extend the lifetime
        for _ in 0..5 {
            advance(Duration::from_secs(59)).await;
            assert!(cache.get("k").is_some());
        }
        advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_least_recently_used() {
        let mut cache = ResponseCache::new(2, Duration::from_secs(300));
        cache.put("a", "1");
        cache.put("b", "2");

        // Touch "a" so "b" becomes the LRU entry
        assert!(cache.get("a").is_some());
        cache.put("c", "3");

        assert!(cache.get("a").is_some());
        assert_eq!(cache.get("b"), None);
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites_existing_key() {
        let mut cache = ResponseCache::new(2, Duration::from_secs(300));
        cache.put("a", "old");
        cache.put("a", "new");
        assert_eq!(cache.get("a").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_do_not_count_against_capacity() {
        let mut cache = ResponseCache::new(2, Duration::from_secs(60));
        cache.put("a", "1");
        cache.put("b", "2");

        advance(Duration::from_secs(61)).await;
        cache.put("c", "3");
        cache.put("d", "4");

        // Expired a/b were purged on put, so both fresh entries fit
        assert!(cache.get("c").is_some());
        assert!(cache.get("d").is_some());
    }
}
