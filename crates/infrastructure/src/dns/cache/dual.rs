use super::{ArcStore, CacheEntry, CacheKey, CacheMetrics};
use localdns_domain::CacheStats;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

struct Stores<P, N> {
    positive: ArcStore<CacheKey, P>,
    negative: LruCache<CacheKey, CacheEntry<N>, FxBuildHasher>,
}

/// Positive and negative answers under one lock.
///
/// Every population removes the key from the other store inside the same
/// critical section, so a key is never present in both.
pub struct DualCache<P, N> {
    stores: Mutex<Stores<P, N>>,
    positive_ttl: Duration,
    negative_ttl: Duration,
    positive_metrics: CacheMetrics,
    negative_metrics: CacheMetrics,
}

impl<P: Clone, N: Clone> DualCache<P, N> {
    pub fn new(capacity: NonZeroUsize, positive_ttl: Duration, negative_ttl: Duration) -> Self {
        Self {
            stores: Mutex::new(Stores {
                positive: ArcStore::new(capacity),
                negative: LruCache::with_hasher(capacity, FxBuildHasher),
            }),
            positive_ttl,
            negative_ttl,
            positive_metrics: CacheMetrics::default(),
            negative_metrics: CacheMetrics::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Stores<P, N>> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_positive(&self, key: &CacheKey) -> Option<P> {
        let now = Instant::now();
        let hit = self.lock().positive.get(key, now);
        match hit {
            Some(_) => self.positive_metrics.record_hit(),
            None => self.positive_metrics.record_miss(),
        }
        hit
    }

    pub fn get_negative(&self, key: &CacheKey) -> Option<N> {
        let now = Instant::now();
        let hit = {
            let mut stores = self.lock();
            let state = stores
                .negative
                .get(key)
                .map(|entry| (entry.is_expired(now), entry.value.clone()));
            match state {
                Some((false, value)) => Some(value),
                Some((true, _)) => {
                    stores.negative.pop(key);
                    None
                }
                None => None,
            }
        };
        match hit {
            Some(_) => self.negative_metrics.record_hit(),
            None => self.negative_metrics.record_miss(),
        }
        hit
    }

    pub fn set_positive(&self, key: CacheKey, value: P) {
        let entry = CacheEntry::new(value, Instant::now(), self.positive_ttl);
        let mut stores = self.lock();
        stores.negative.pop(&key);
        stores.positive.insert(key, entry);
    }

    pub fn set_negative(&self, key: CacheKey, value: N) {
        let entry = CacheEntry::new(value, Instant::now(), self.negative_ttl);
        let mut stores = self.lock();
        stores.positive.remove(&key);
        stores.negative.put(key, entry);
    }

    /// Empty both stores. Hit and miss counters are kept.
    pub fn purge(&self) {
        let mut stores = self.lock();
        stores.positive.clear();
        stores.negative.clear();
    }

    pub fn positive_stats(&self) -> CacheStats {
        self.positive_metrics.snapshot()
    }

    pub fn negative_stats(&self) -> CacheStats {
        self.negative_metrics.snapshot()
    }

    pub fn positive_len(&self) -> usize {
        self.lock().positive.len()
    }

    pub fn negative_len(&self) -> usize {
        self.lock().negative.len()
    }
}
