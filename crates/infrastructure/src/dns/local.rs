use super::forwarding::{MessageBuilder, QuestionNormalizer};
use hickory_proto::op::Message;
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record};
use localdns_domain::{fqdn, ConfigError, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Authoritative loopback answers for the development TLDs.
pub struct LocalResponder {
    tlds: Vec<String>,
    ttl: u32,
}

impl LocalResponder {
    pub fn new<S: AsRef<str>>(tlds: &[S], ttl: u32) -> Result<Self, ConfigError> {
        let tlds: Vec<String> = tlds
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(fqdn)
            .collect();

        if tlds.is_empty() {
            return Err(ConfigError::NoTlds);
        }

        Ok(Self { tlds, ttl })
    }

    pub fn tlds(&self) -> &[String] {
        &self.tlds
    }

    /// True when `name` is one of the TLDs or lies under one of them.
    pub fn matches(&self, name: &str) -> bool {
        let name = fqdn(name);
        self.tlds.iter().any(|tld| {
            name == *tld
                || (name.len() > tld.len()
                    && name.ends_with(tld.as_str())
                    && name.as_bytes()[name.len() - tld.len() - 1] == b'.')
        })
    }

    pub fn respond(&self, request: &Message) -> Message {
        let question = match QuestionNormalizer::normalize(request) {
            Ok(question) => question,
            Err(e) => {
                debug!(error = %e, "Local query not answerable");
                return MessageBuilder::server_failure(request);
            }
        };

        let rdata = match question.record_type() {
            RecordType::A => RData::A(A(Ipv4Addr::LOCALHOST)),
            RecordType::AAAA => RData::AAAA(AAAA(Ipv6Addr::LOCALHOST)),
        };

        let mut reply = MessageBuilder::reply_to(request);
        reply.set_authoritative(true);

        if let Some(query) = request.queries().first() {
            reply.add_answer(Record::from_rdata(query.name().clone(), self.ttl, rdata));
        }

        debug!(question = %question, ttl = self.ttl, "Answered locally");
        reply
    }
}
