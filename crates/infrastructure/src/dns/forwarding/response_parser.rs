use hickory_proto::op::Message;
use localdns_domain::{DomainError, Nameserver};

pub struct ResponseParser;

impl ResponseParser {
    /// Decode an upstream reply and check it answers the request `expected_id`.
    pub fn parse(
        bytes: &[u8],
        expected_id: u16,
        server: &Nameserver,
    ) -> Result<Message, DomainError> {
        let message = Message::from_vec(bytes).map_err(|e| DomainError::InvalidDnsResponse {
            server: server.to_string(),
            reason: e.to_string(),
        })?;

        if message.id() != expected_id {
            return Err(DomainError::InvalidDnsResponse {
                server: server.to_string(),
                reason: format!("id mismatch: sent {}, got {}", expected_id, message.id()),
            });
        }

        Ok(message)
    }
}
