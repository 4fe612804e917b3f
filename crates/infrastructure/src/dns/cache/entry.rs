use std::time::Duration;
use tokio::time::Instant;

/// Cached value with its insertion time and absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now,
            expires_at: now + ttl,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
