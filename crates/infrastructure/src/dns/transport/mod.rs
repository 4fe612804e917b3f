pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use localdns_domain::{DomainError, Nameserver, Protocol};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::lookup_host;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Vec<u8>,
    /// Which protocol was used
    pub protocol_used: Protocol,
}

/// Trait for sending raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// One request/response exchange. `timeout` bounds the whole exchange:
    /// host lookup, connect, write and read.
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;
}

/// Enum-dispatched transport, no Box/vtable on the per-attempt path.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    /// Transport toward `server` speaking `protocol`.
    pub fn new(server: Nameserver, protocol: Protocol) -> Self {
        match protocol {
            Protocol::Udp => Self::Udp(udp::UdpTransport::new(server)),
            Protocol::Tcp => Self::Tcp(tcp::TcpTransport::new(server)),
        }
    }

    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }
}

/// Socket address of `server`, resolving hostnames on every call.
pub(crate) async fn resolve(server: &Nameserver) -> Result<SocketAddr, DomainError> {
    if let Some(addr) = server.socket_addr() {
        return Ok(addr);
    }

    lookup_host((server.host(), server.port()))
        .await
        .map_err(|e| io_error(server, e))?
        .next()
        .ok_or_else(|| DomainError::TransportIo {
            server: server.to_string(),
            reason: "host lookup returned no addresses".into(),
        })
}

pub(crate) fn io_error(server: &Nameserver, e: io::Error) -> DomainError {
    if e.kind() == io::ErrorKind::ConnectionRefused {
        DomainError::TransportConnectionRefused {
            server: server.to_string(),
        }
    } else {
        DomainError::TransportIo {
            server: server.to_string(),
            reason: e.to_string(),
        }
    }
}

pub(crate) fn timeout_error(server: &Nameserver, timeout: Duration) -> DomainError {
    DomainError::TransportTimeout {
        server: server.to_string(),
        timeout_ms: timeout.as_millis() as u64,
    }
}
