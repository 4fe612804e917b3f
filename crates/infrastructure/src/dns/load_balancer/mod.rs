pub mod query;
pub mod race;

pub use query::{query_server, QueryAttemptResult};
pub use race::{UpstreamRacer, UpstreamResult};
