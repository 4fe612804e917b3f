// Cache module: positive ARC store and negative LRU store behind one lock

pub mod arc;
pub mod dual;
pub mod entry;
pub mod key;
pub mod metrics;

pub use arc::ArcStore;
pub use dual::DualCache;
pub use entry::CacheEntry;
pub use key::CacheKey;
pub use metrics::CacheMetrics;
