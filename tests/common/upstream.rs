use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record, RecordType};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy)]
pub enum UpstreamMode {
    Answer(Ipv4Addr),
    NxDomain,
    ServFail,
    Silent,
}

/// Fake upstream resolver on 127.0.0.1, UDP and TCP on one port.
pub struct Upstream {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl Upstream {
    pub async fn start(mode: UpstreamMode) -> Self {
        let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = udp.local_addr().unwrap();
        let tcp = TcpListener::bind(addr).await.unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let udp_hits = Arc::clone(&hits);
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            while let Ok((len, peer)) = udp.recv_from(&mut buf).await {
                udp_hits.fetch_add(1, Ordering::SeqCst);
                if let Some(reply) = reply_for(&buf[..len], mode) {
                    let _ = udp.send_to(&reply, peer).await;
                }
            }
        });

        let tcp_hits = Arc::clone(&hits);
        let tcp_task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = tcp.accept().await {
                let hits = Arc::clone(&tcp_hits);
                tokio::spawn(async move {
                    while let Ok(len) = stream.read_u16().await {
                        let mut query = vec![0u8; len as usize];
                        if stream.read_exact(&mut query).await.is_err() {
                            return;
                        }
                        hits.fetch_add(1, Ordering::SeqCst);
                        if let Some(reply) = reply_for(&query, mode) {
                            let _ = stream.write_u16(reply.len() as u16).await;
                            let _ = stream.write_all(&reply).await;
                        }
                    }
                });
            }
        });

        Self {
            addr,
            hits,
            tasks: vec![udp_task, tcp_task],
        }
    }

    pub fn nameserver(&self) -> String {
        self.addr.to_string()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for Upstream {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn reply_for(query: &[u8], mode: UpstreamMode) -> Option<Vec<u8>> {
    let request = Message::from_vec(query).ok()?;
    let mut reply = Message::new();
    reply
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .add_queries(request.queries().to_vec());

    match mode {
        UpstreamMode::Silent => return None,
        UpstreamMode::NxDomain => {
            reply.set_response_code(ResponseCode::NXDomain);
        }
        UpstreamMode::ServFail => {
            reply.set_response_code(ResponseCode::ServFail);
        }
        UpstreamMode::Answer(ip) => {
            for q in request.queries() {
                let rdata = match q.query_type() {
                    RecordType::A => RData::A(A(ip)),
                    RecordType::AAAA => RData::AAAA(AAAA(ip.to_ipv6_mapped())),
                    _ => continue,
                };
                reply.add_answer(Record::from_rdata(q.name().clone(), 300, rdata));
            }
        }
    }

    reply.to_vec().ok()
}
