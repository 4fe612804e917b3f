use crate::config::ConfigError;
use crate::protocol::Protocol;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("Invalid DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Invalid DNS response from {server}: {reason}")]
    InvalidDnsResponse { server: String, reason: String },

    #[error("Timeout after {timeout_ms}ms waiting for {server}")]
    TransportTimeout { server: String, timeout_ms: u64 },

    #[error("Connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("I/O error talking to {server}: {reason}")]
    TransportIo { server: String, reason: String },

    #[error("{server} answered SERVFAIL")]
    UpstreamServerFailure { server: String },

    #[error("resolv failed on {servers} ({protocol})")]
    ResolutionFailed { servers: String, protocol: Protocol },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
