use super::CacheEntry;
use lru::LruCache;
use rustc_hash::FxBuildHasher;
use std::hash::Hash;
use std::num::NonZeroUsize;
use tokio::time::Instant;

type Resident<K, V> = LruCache<K, CacheEntry<V>, FxBuildHasher>;
type Ghost<K> = LruCache<K, (), FxBuildHasher>;

/// Adaptive Replacement Cache.
///
/// `recent` holds keys seen once, `frequent` keys seen at least twice. The
/// ghost lists remember keys evicted from each side; a miss that hits a ghost
/// moves `target_recent` toward the side that would have kept it. A scan of
/// one-off keys only ever churns `recent`, so hot entries in `frequent`
/// survive it.
///
/// Expired entries are dropped when read and leave no ghost behind.
pub struct ArcStore<K, V> {
    capacity: usize,
    target_recent: usize,
    recent: Resident<K, V>,
    frequent: Resident<K, V>,
    recent_ghost: Ghost<K>,
    frequent_ghost: Ghost<K>,
}

impl<K: Hash + Eq + Clone, V: Clone> ArcStore<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: capacity.get(),
            target_recent: 0,
            recent: LruCache::unbounded_with_hasher(FxBuildHasher),
            frequent: LruCache::unbounded_with_hasher(FxBuildHasher),
            recent_ghost: LruCache::unbounded_with_hasher(FxBuildHasher),
            frequent_ghost: LruCache::unbounded_with_hasher(FxBuildHasher),
        }
    }

    /// Live value for `key`. A hit promotes the key to the frequent list.
    pub fn get(&mut self, key: &K, now: Instant) -> Option<V> {
        if let Some(entry) = self.recent.pop(key) {
            if entry.is_expired(now) {
                return None;
            }
            let value = entry.value.clone();
            self.frequent.put(key.clone(), entry);
            return Some(value);
        }

        let expired = match self.frequent.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.frequent.pop(key);
        }
        None
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&mut self, key: K, entry: CacheEntry<V>) {
        if self.recent.pop(&key).is_some() {
            self.frequent.put(key, entry);
            return;
        }
        if self.frequent.contains(&key) {
            self.frequent.put(key, entry);
            return;
        }

        if self.recent_ghost.contains(&key) {
            let step = (self.frequent_ghost.len() / self.recent_ghost.len()).max(1);
            self.target_recent = (self.target_recent + step).min(self.capacity);
            self.replace(false);
            self.recent_ghost.pop(&key);
            self.frequent.put(key, entry);
            return;
        }

        if self.frequent_ghost.contains(&key) {
            let step = (self.recent_ghost.len() / self.frequent_ghost.len()).max(1);
            self.target_recent = self.target_recent.saturating_sub(step);
            self.replace(true);
            self.frequent_ghost.pop(&key);
            self.frequent.put(key, entry);
            return;
        }

        if self.recent.len() + self.recent_ghost.len() >= self.capacity {
            if self.recent.len() < self.capacity {
                self.recent_ghost.pop_lru();
                self.replace(false);
            } else {
                self.recent.pop_lru();
            }
        } else {
            let total = self.recent.len()
                + self.frequent.len()
                + self.recent_ghost.len()
                + self.frequent_ghost.len();
            if total >= self.capacity {
                if total >= 2 * self.capacity && self.frequent_ghost.pop_lru().is_none() {
                    self.recent_ghost.pop_lru();
                }
                self.replace(false);
            }
        }

        self.recent.put(key, entry);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.recent
            .pop(key)
            .or_else(|| self.frequent.pop(key))
            .map(|entry| entry.value)
    }

    /// Resident entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.recent.len() + self.frequent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.recent.clear();
        self.frequent.clear();
        self.recent_ghost.clear();
        self.frequent_ghost.clear();
        self.target_recent = 0;
    }

    /// Evict one resident entry into its ghost list when the store is full.
    fn replace(&mut self, hit_frequent_ghost: bool) {
        if self.len() < self.capacity {
            return;
        }

        let recent_len = self.recent.len();
        let prefer_recent = recent_len > 0
            && (recent_len > self.target_recent
                || (hit_frequent_ghost && recent_len == self.target_recent));

        if prefer_recent || self.frequent.is_empty() {
            if let Some((key, _)) = self.recent.pop_lru() {
                self.recent_ghost.put(key, ());
            }
        } else if let Some((key, _)) = self.frequent.pop_lru() {
            self.frequent_ghost.put(key, ());
        }
    }
}
