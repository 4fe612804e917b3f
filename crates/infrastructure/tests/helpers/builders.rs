use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);
pub const TEST_EXPIRE: Duration = Duration::from_secs(60);

pub fn query(id: u16, name: &str, record_type: RecordType) -> Message {
    query_with_class(id, name, record_type, DNSClass::IN)
}

pub fn query_with_class(id: u16, name: &str, record_type: RecordType, class: DNSClass) -> Message {
    let mut q = Query::query(Name::from_ascii(name).unwrap(), record_type);
    q.set_query_class(class);

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(q);
    message
}

/// `version.bind. CH TXT`, the classic CHAOS version query.
pub fn chaos_query(id: u16) -> Message {
    query_with_class(id, "version.bind.", RecordType::TXT, DNSClass::CH)
}

/// Addresses carried by the answer section.
pub fn answer_ips(message: &Message) -> Vec<IpAddr> {
    message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            Some(RData::A(a)) => Some(IpAddr::V4(a.0)),
            Some(RData::AAAA(aaaa)) => Some(IpAddr::V6(aaaa.0)),
            _ => None,
        })
        .collect()
}

/// A local port with nothing listening on it.
pub async fn closed_port_addr() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.local_addr().unwrap()
}
