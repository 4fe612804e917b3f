use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record, RecordType};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;

/// How the mock upstream answers every query it receives.
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// A records get the address, AAAA records its IPv4-mapped form
    Answer(Ipv4Addr),
    NxDomain,
    ServFail,
    /// NOERROR without records
    Empty,
    /// Read the query, never reply
    Stall,
    /// Valid answer carrying another transaction id
    WrongId(Ipv4Addr),
    /// Answer after a pause
    Delayed(Ipv4Addr, Duration),
    /// That many A records, 10.0.0.1 upwards
    ManyAnswers(u8),
}

impl MockBehavior {
    fn delay(&self) -> Option<Duration> {
        match self {
            MockBehavior::Delayed(_, delay) => Some(*delay),
            _ => None,
        }
    }
}

/// Mock upstream DNS server listening on UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_requests: Arc<AtomicUsize>,
    tcp_requests: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> std::io::Result<Self> {
        let udp = Arc::new(UdpSocket::bind("127.0.0.1:0").await?);
        let addr = udp.local_addr()?;
        let tcp = TcpListener::bind(addr).await?;

        let udp_requests = Arc::new(AtomicUsize::new(0));
        let tcp_requests = Arc::new(AtomicUsize::new(0));

        let udp_counter = Arc::clone(&udp_requests);
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let Ok((len, peer)) = udp.recv_from(&mut buf).await else {
                    continue;
                };
                udp_counter.fetch_add(1, Ordering::SeqCst);
                let query = buf[..len].to_vec();
                let udp = Arc::clone(&udp);
                tokio::spawn(async move {
                    if let Some(delay) = behavior.delay() {
                        tokio::time::sleep(delay).await;
                    }
                    if let Some(reply) = build_reply(&query, behavior) {
                        let _ = udp.send_to(&reply, peer).await;
                    }
                });
            }
        });

        let tcp_counter = Arc::clone(&tcp_requests);
        let tcp_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = tcp.accept().await else {
                    continue;
                };
                let counter = Arc::clone(&tcp_counter);
                tokio::spawn(serve_tcp_connection(stream, behavior, counter));
            }
        });

        Ok(Self {
            addr,
            udp_requests,
            tcp_requests,
            tasks: vec![udp_task, tcp_task],
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Address in the form the proxy configuration takes.
    pub fn nameserver(&self) -> String {
        self.addr.to_string()
    }

    pub fn udp_requests(&self) -> usize {
        self.udp_requests.load(Ordering::SeqCst)
    }

    pub fn tcp_requests(&self) -> usize {
        self.tcp_requests.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.udp_requests() + self.tcp_requests()
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn serve_tcp_connection(
    mut stream: TcpStream,
    behavior: MockBehavior,
    counter: Arc<AtomicUsize>,
) {
    loop {
        let Ok(len) = stream.read_u16().await else {
            return;
        };
        let mut query = vec![0u8; len as usize];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = behavior.delay() {
            tokio::time::sleep(delay).await;
        }

        let Some(reply) = build_reply(&query, behavior) else {
            continue;
        };
        let mut frame = (reply.len() as u16).to_be_bytes().to_vec();
        frame.extend_from_slice(&reply);
        if stream.write_all(&frame).await.is_err() {
            return;
        }
    }
}

fn build_reply(query: &[u8], behavior: MockBehavior) -> Option<Vec<u8>> {
    let request = Message::from_vec(query).ok()?;

    let mut reply = Message::new();
    reply
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .add_queries(request.queries().to_vec());

    match behavior {
        MockBehavior::Stall => return None,
        MockBehavior::NxDomain => {
            reply.set_response_code(ResponseCode::NXDomain);
        }
        MockBehavior::ServFail => {
            reply.set_response_code(ResponseCode::ServFail);
        }
        MockBehavior::Empty => {}
        MockBehavior::Answer(ip) | MockBehavior::Delayed(ip, _) => {
            add_answers(&mut reply, &request, ip)
        }
        MockBehavior::ManyAnswers(count) => {
            for query in request.queries() {
                for n in 1..=count {
                    let rdata = RData::A(A(Ipv4Addr::new(10, 0, 0, n)));
                    reply.add_answer(Record::from_rdata(query.name().clone(), 60, rdata));
                }
            }
        }
        MockBehavior::WrongId(ip) => {
            add_answers(&mut reply, &request, ip);
            reply.set_id(request.id().wrapping_add(1));
        }
    }

    reply.to_vec().ok()
}

fn add_answers(reply: &mut Message, request: &Message, ip: Ipv4Addr) {
    for query in request.queries() {
        let rdata = match query.query_type() {
            RecordType::A => RData::A(A(ip)),
            RecordType::AAAA => RData::AAAA(AAAA(ip.to_ipv6_mapped())),
            _ => continue,
        };
        reply.add_answer(Record::from_rdata(query.name().clone(), 60, rdata));
    }
}
