use super::query::query_server;
use crate::dns::forwarding::MessageBuilder;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use hickory_proto::op::Message;
use localdns_domain::{ConfigError, DomainError, Nameserver, Protocol};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Winning upstream answer of a race.
#[derive(Debug, Clone)]
pub struct UpstreamResult {
    pub message: Message,
    pub server: Nameserver,
    pub latency_ms: u64,
    pub protocol: Protocol,
}

type AttemptOutcome = Result<Result<UpstreamResult, DomainError>, JoinError>;

/// Races a query against the upstreams with a staggered start.
///
/// Attempts launch in configured order, one stagger apart. The first answer
/// that is not SERVFAIL wins; the attempts still running are detached and
/// finish on their own.
pub struct UpstreamRacer {
    servers: Arc<[Nameserver]>,
    timeout: Duration,
    stagger: Duration,
}

impl UpstreamRacer {
    pub fn new(
        servers: Vec<Nameserver>,
        timeout: Duration,
        stagger: Duration,
    ) -> Result<Self, DomainError> {
        if servers.is_empty() {
            return Err(ConfigError::NoNameservers.into());
        }
        Ok(Self {
            servers: servers.into(),
            timeout,
            stagger,
        })
    }

    pub async fn race(
        &self,
        request: &Message,
        protocol: Protocol,
    ) -> Result<UpstreamResult, DomainError> {
        let query_bytes: Arc<[u8]> = MessageBuilder::serialize(request)?.into();
        let query_id = request.id();

        debug!(
            strategy = "staggered",
            servers = self.servers.len(),
            protocol = %protocol,
            "Racing upstreams"
        );

        let mut attempts = FuturesUnordered::new();

        for (index, server) in self.servers.iter().enumerate() {
            if index > 0 {
                let stagger = tokio::time::sleep(self.stagger);
                tokio::pin!(stagger);
                loop {
                    tokio::select! {
                        biased;
                        Some(outcome) = attempts.next(), if !attempts.is_empty() => {
                            if let Some(result) = Self::conclude(outcome) {
                                return Ok(result);
                            }
                        }
                        _ = &mut stagger => break,
                    }
                }
            }

            let server = server.clone();
            let query_bytes = Arc::clone(&query_bytes);
            let timeout = self.timeout;
            attempts.push(tokio::spawn(async move {
                let attempt =
                    query_server(&server, &query_bytes, query_id, protocol, timeout).await?;
                Ok::<_, DomainError>(UpstreamResult {
                    message: attempt.message,
                    server,
                    latency_ms: attempt.latency_ms,
                    protocol,
                })
            }));
        }

        while let Some(outcome) = attempts.next().await {
            if let Some(result) = Self::conclude(outcome) {
                return Ok(result);
            }
        }

        Err(DomainError::ResolutionFailed {
            servers: self
                .servers
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("; "),
            protocol,
        })
    }

    fn conclude(outcome: AttemptOutcome) -> Option<UpstreamResult> {
        match outcome {
            Ok(Ok(result)) => {
                debug!(
                    server = %result.server,
                    latency_ms = result.latency_ms,
                    rcode = ?result.message.response_code(),
                    "Fastest usable response"
                );
                Some(result)
            }
            Ok(Err(e @ DomainError::UpstreamServerFailure { .. })) => {
                debug!(error = %e, "Discarding upstream answer");
                None
            }
            Ok(Err(e)) => {
                info!(error = %e, "Upstream attempt failed");
                None
            }
            Err(e) => {
                warn!(error = %e, "Upstream attempt task panicked");
                None
            }
        }
    }
}
