/// Counters of one cache store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub lookups: u64,
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn from_counts(hits: u64, misses: u64) -> Self {
        let lookups = hits + misses;
        let hit_rate = if lookups > 0 {
            hits as f64 / lookups as f64
        } else {
            0.0
        };

        Self {
            hits,
            misses,
            lookups,
            hit_rate,
        }
    }
}
