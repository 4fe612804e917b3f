use crate::dns::forwarding::ResponseParser;
use crate::dns::transport::Transport;
use hickory_proto::op::{Message, ResponseCode};
use localdns_domain::{DomainError, Nameserver, Protocol};
use std::time::{Duration, Instant};
use tracing::debug;

pub struct QueryAttemptResult {
    pub message: Message,
    pub latency_ms: u64,
}

/// One exchange with one upstream. A decoded SERVFAIL counts as a failure.
pub async fn query_server(
    server: &Nameserver,
    query_bytes: &[u8],
    query_id: u16,
    protocol: Protocol,
    timeout: Duration,
) -> Result<QueryAttemptResult, DomainError> {
    let start = Instant::now();

    let transport = Transport::new(server.clone(), protocol);
    let transport_response = transport.send(query_bytes, timeout).await?;
    let message = ResponseParser::parse(&transport_response.bytes, query_id, server)?;

    let latency_ms = start.elapsed().as_millis() as u64;
    debug!(
        server = %server,
        protocol = %transport_response.protocol_used,
        bytes = transport_response.bytes.len(),
        latency_ms = latency_ms,
        "Upstream exchange complete"
    );

    if message.response_code() == ResponseCode::ServFail {
        debug!(server = %server, latency_ms = latency_ms, "Upstream answered SERVFAIL");
        return Err(DomainError::UpstreamServerFailure {
            server: server.to_string(),
        });
    }

    Ok(QueryAttemptResult {
        message,
        latency_ms,
    })
}
