/// Operator actions on a running server, fired from outside the query path
/// (OS signals on Unix). Implementations must be safe to call while queries
/// are being served.
pub trait AdminTriggers: Send + Sync {
    /// Empty every cache store. Statistics are kept.
    fn flush(&self);

    /// Log the current cache statistics.
    fn dump_stats(&self);
}
