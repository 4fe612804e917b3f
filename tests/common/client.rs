use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RData, RecordType};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(3);

/// Minimal stub resolver talking to the server under test.
pub struct TestClient {
    server: SocketAddr,
}

impl TestClient {
    pub fn new(server: SocketAddr) -> Self {
        Self { server }
    }

    pub fn build(id: u16, domain: &str, record_type: RecordType) -> Message {
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(Query::query(Name::from_ascii(domain).unwrap(), record_type));
        message
    }

    pub async fn query_udp(&self, id: u16, domain: &str, record_type: RecordType) -> Message {
        let request = Self::build(id, domain, record_type).to_vec().unwrap();
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(&request, self.server).await.unwrap();

        let mut buf = vec![0u8; 4096];
        let (len, _) = tokio::time::timeout(CLIENT_TIMEOUT, socket.recv_from(&mut buf))
            .await
            .expect("no UDP reply")
            .unwrap();
        Message::from_vec(&buf[..len]).unwrap()
    }

    pub async fn query_tcp(&self, id: u16, domain: &str, record_type: RecordType) -> Message {
        let request = Self::build(id, domain, record_type).to_vec().unwrap();
        let mut stream = TcpStream::connect(self.server).await.unwrap();
        stream.write_u16(request.len() as u16).await.unwrap();
        stream.write_all(&request).await.unwrap();

        let reply = tokio::time::timeout(CLIENT_TIMEOUT, async {
            let len = stream.read_u16().await.unwrap();
            let mut reply = vec![0u8; len as usize];
            stream.read_exact(&mut reply).await.unwrap();
            reply
        })
        .await
        .expect("no TCP reply");
        Message::from_vec(&reply).unwrap()
    }

    pub fn addresses(message: &Message) -> Vec<IpAddr> {
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
}
