//! localdns domain layer
pub mod cache_stats;
pub mod config;
pub mod errors;
pub mod nameserver;
pub mod protocol;
pub mod question;

pub use cache_stats::CacheStats;
pub use config::{CliOverrides, Config, ConfigError, ProxySettings, DEFAULT_STAGGER};
pub use errors::DomainError;
pub use nameserver::{Nameserver, DEFAULT_DNS_PORT};
pub use protocol::Protocol;
pub use question::{fqdn, Question, RecordType};
