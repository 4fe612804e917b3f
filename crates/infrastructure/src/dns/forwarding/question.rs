use super::record_type_map::RecordTypeMapper;
use hickory_proto::op::{Message, OpCode};
use hickory_proto::rr::DNSClass;
use localdns_domain::{DomainError, Question};

/// Extracts the one question the proxy knows how to cache.
pub struct QuestionNormalizer;

impl QuestionNormalizer {
    /// First question of a standard query with class IN and type A or AAAA.
    pub fn normalize(message: &Message) -> Result<Question, DomainError> {
        if message.op_code() != OpCode::Query {
            return Err(DomainError::UnsupportedQuery(format!(
                "opcode {:?}",
                message.op_code()
            )));
        }

        let query = message
            .queries()
            .first()
            .ok_or_else(|| DomainError::UnsupportedQuery("no question".into()))?;

        if query.query_class() != DNSClass::IN {
            return Err(DomainError::UnsupportedQuery(format!(
                "class {}",
                query.query_class()
            )));
        }

        let record_type = RecordTypeMapper::from_hickory(query.query_type()).ok_or_else(|| {
            DomainError::UnsupportedQuery(format!("type {}", query.query_type()))
        })?;

        Ok(Question::new(&query.name().to_ascii(), record_type))
    }
}
