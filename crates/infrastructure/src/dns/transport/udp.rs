use super::{io_error, resolve, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use localdns_domain::{DomainError, Nameserver, Protocol};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP: a fresh connected socket on an ephemeral port per exchange.
pub struct UdpTransport {
    server: Nameserver,
}

impl UdpTransport {
    pub fn new(server: Nameserver) -> Self {
        Self { server }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let server_addr = resolve(&self.server).await?;

        let bind_addr = if server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| io_error(&self.server, e))?;
        socket
            .connect(server_addr)
            .await
            .map_err(|e| io_error(&self.server, e))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| io_error(&self.server, e))?;

        debug!(server = %self.server, bytes_sent = bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let bytes_received = socket
            .recv(&mut recv_buf)
            .await
            .map_err(|e| io_error(&self.server, e))?;
        recv_buf.truncate(bytes_received);

        debug!(server = %self.server, bytes_received = bytes_received, "UDP response received");

        Ok(recv_buf)
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(message_bytes))
            .await
            .map_err(|_| timeout_error(&self.server, timeout))??;

        Ok(TransportResponse {
            bytes,
            protocol_used: Protocol::Udp,
        })
    }
}
