//! DNS Message Builder
//!
//! Builds the replies the server produces itself: echoes of the request
//! header and question with a chosen response code.

use hickory_proto::op::{Message, MessageType, ResponseCode};
use localdns_domain::DomainError;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Response skeleton for `request`: id, opcode, RD/CD and the questions
    /// copied, no records.
    pub fn reply_to(request: &Message) -> Message {
        let mut reply = Message::new();
        reply
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(true)
            .set_checking_disabled(request.checking_disabled())
            .add_queries(request.queries().to_vec());
        reply
    }

    pub fn reply_with_rcode(request: &Message, rcode: ResponseCode) -> Message {
        let mut reply = Self::reply_to(request);
        reply.set_response_code(rcode);
        reply
    }

    /// Generic failure answer.
    pub fn server_failure(request: &Message) -> Message {
        Self::reply_with_rcode(request, ResponseCode::ServFail)
    }

    /// Serialize a Message to wire format bytes
    pub fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
        message.to_vec().map_err(|e| {
            DomainError::InvalidDnsMessage(format!("Failed to serialize DNS message: {}", e))
        })
    }
}
