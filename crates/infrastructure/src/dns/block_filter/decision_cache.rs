use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecisionCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Memoized block decisions keyed by normalized domain.
///
/// Entries never expire; they leave only through LRU eviction or `clear`.
/// A lookup that finds nothing counts as a miss.
pub struct BlockDecisionCache {
    inner: Mutex<LruCache<String, bool>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BlockDecisionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached decision and marks it most recently used.
    #[inline]
    pub fn get(&self, domain: &str) -> Option<bool> {
        let decision = self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(domain)
            .copied();

        match decision {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        decision
    }

    #[inline]
    pub fn insert(&self, domain: String, blocked: bool) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(domain, blocked);
    }

    /// Presence check that leaves recency and counters untouched.
    pub fn contains(&self, domain: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .peek(domain)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cap()
            .get()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn stats(&self) -> DecisionCacheStats {
        let (entries, capacity) = {
            let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            (guard.len(), guard.cap().get())
        };
        DecisionCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
            capacity,
        }
    }
}
