use super::forwarding::MessageBuilder;
use super::local::LocalResponder;
use super::proxy::DnsProxy;
use async_trait::async_trait;
use hickory_proto::op::{Edns, Header, Message, MessageType, ResponseCode};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{
    Protocol as ServerProtocol, Request, RequestHandler, ResponseHandler, ResponseInfo,
};
use localdns_domain::Protocol;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes decoded queries: loopback TLDs to the local responder, everything
/// else to the proxy when one is configured.
pub struct DnsServerHandler {
    local: LocalResponder,
    proxy: Option<Arc<DnsProxy>>,
}

impl DnsServerHandler {
    pub fn new(local: LocalResponder, proxy: Option<Arc<DnsProxy>>) -> Self {
        Self { local, proxy }
    }

    pub async fn handle(&self, request: &Message, protocol: Protocol) -> Message {
        let is_local = request
            .queries()
            .first()
            .is_some_and(|q| self.local.matches(&q.name().to_ascii()));

        if is_local {
            return self.local.respond(request);
        }

        match &self.proxy {
            Some(proxy) => proxy.handle(request, protocol).await,
            None => {
                debug!(id = request.id(), "No proxy configured, refusing query");
                MessageBuilder::server_failure(request)
            }
        }
    }
}

#[async_trait]
impl RequestHandler for DnsServerHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        if request.message_type() == MessageType::Response {
            debug!(id = request.id(), src = %request.src(), "Ignoring inbound response message");
            return failure_info(request.header());
        }

        let protocol = match request.protocol() {
            ServerProtocol::Udp => Protocol::Udp,
            _ => Protocol::Tcp,
        };

        let reply = self.handle(&to_message(request), protocol).await;

        let mut builder = MessageResponseBuilder::from_message_request(request);
        if request.edns().is_some() {
            let mut edns = Edns::new();
            edns.set_max_payload(request.max_payload());
            builder.edns(edns);
        }

        let response = builder.build(
            *reply.header(),
            reply.answers(),
            reply.name_servers(),
            std::iter::empty(),
            reply.additionals(),
        );

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, id = request.id(), src = %request.src(), "Failed to send reply");
                failure_info(request.header())
            }
        }
    }
}

/// The decoded request as a plain message, client letter case preserved.
fn to_message(request: &Request) -> Message {
    let mut message = Message::new();
    message
        .set_id(request.id())
        .set_message_type(request.message_type())
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_checking_disabled(request.checking_disabled())
        .set_authentic_data(request.authentic_data());
    message.add_query(request.query().original().clone());
    if let Some(edns) = request.edns() {
        message.set_edns(edns.clone());
    }
    message
}

fn failure_info(request_header: &Header) -> ResponseInfo {
    let mut header = Header::response_from_request(request_header);
    header.set_response_code(ResponseCode::ServFail);
    header.into()
}
