use super::{io_error, resolve, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use localdns_domain::{DomainError, Nameserver, Protocol};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP with the 2-byte big-endian length prefix of RFC 1035 §4.2.2.
pub struct TcpTransport {
    server: Nameserver,
}

impl TcpTransport {
    pub fn new(server: Nameserver) -> Self {
        Self { server }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let len = u16::try_from(message_bytes.len()).map_err(|_| {
            DomainError::InvalidDnsMessage(format!(
                "message of {} bytes does not fit a TCP frame",
                message_bytes.len()
            ))
        })?;

        let server_addr = resolve(&self.server).await?;
        let mut stream = TcpStream::connect(server_addr)
            .await
            .map_err(|e| io_error(&self.server, e))?;
        stream.set_nodelay(true).ok();

        let mut frame = Vec::with_capacity(2 + message_bytes.len());
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(message_bytes);
        stream
            .write_all(&frame)
            .await
            .map_err(|e| io_error(&self.server, e))?;

        debug!(server = %self.server, bytes_sent = message_bytes.len(), "TCP query sent");

        let mut len_buf = [0u8; 2];
        stream
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| io_error(&self.server, e))?;
        let response_len = u16::from_be_bytes(len_buf) as usize;

        let mut response = vec![0u8; response_len];
        stream
            .read_exact(&mut response)
            .await
            .map_err(|e| io_error(&self.server, e))?;

        debug!(server = %self.server, bytes_received = response_len, "TCP response received");

        Ok(response)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
            protocol_used: Protocol::Tcp,
        })
    }
}
