#[path = "../common/mod.rs"]
mod common;

use common::{TestClient, TestDomains, TestServerBuilder, Upstream, UpstreamMode};
use hickory_proto::op::{MessageType, ResponseCode};
use hickory_proto::rr::RecordType;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[tokio::test]
async fn test_local_tld_resolves_to_loopback_over_udp_and_tcp() {
    let server = TestServerBuilder::new().start().await;
    let client = TestClient::new(server.addr());

    let a = client.query_udp(1, TestDomains::local_app(), RecordType::A).await;
    assert_eq!(a.id(), 1);
    assert_eq!(a.message_type(), MessageType::Response);
    assert!(a.authoritative());
    assert_eq!(TestClient::addresses(&a), vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);

    let aaaa = client.query_tcp(2, TestDomains::local_nested(), RecordType::AAAA).await;
    assert_eq!(aaaa.id(), 2);
    assert_eq!(TestClient::addresses(&aaaa), vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]);
}

#[tokio::test]
async fn test_multiple_tlds() {
    let server = TestServerBuilder::new().with_tlds(&["dev", "test"]).start().await;
    let client = TestClient::new(server.addr());

    let reply = client.query_udp(3, "shop.test.", RecordType::A).await;
    assert_eq!(TestClient::addresses(&reply), vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
}

#[tokio::test]
async fn test_non_local_name_without_proxy_is_servfail() {
    let server = TestServerBuilder::new().start().await;
    let client = TestClient::new(server.addr());

    let reply = client.query_udp(4, TestDomains::example(), RecordType::A).await;
    assert_eq!(reply.response_code(), ResponseCode::ServFail);
    assert!(reply.answers().is_empty());
}

#[tokio::test]
async fn test_proxied_answer_is_cached_across_transports() {
    let upstream = Upstream::start(UpstreamMode::Answer(Ipv4Addr::new(93, 184, 216, 34))).await;
    let server = TestServerBuilder::new()
        .with_upstreams(vec![upstream.nameserver()])
        .start()
        .await;
    let client = TestClient::new(server.addr());

    let first = client.query_udp(10, TestDomains::example(), RecordType::A).await;
    assert_eq!(first.id(), 10);
    assert_eq!(first.response_code(), ResponseCode::NoError);
    assert_eq!(
        TestClient::addresses(&first),
        vec![IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))]
    );
    assert_eq!(upstream.hits(), 1);

    let second = client.query_tcp(11, TestDomains::example(), RecordType::A).await;
    assert_eq!(second.id(), 11);
    assert_eq!(TestClient::addresses(&second), TestClient::addresses(&first));
    assert_eq!(upstream.hits(), 1);

    let proxy = server.proxy().unwrap();
    assert_eq!(proxy.cache().positive_stats().hits, 1);
}

#[tokio::test]
async fn test_local_tld_never_reaches_upstream() {
    let upstream = Upstream::start(UpstreamMode::Answer(Ipv4Addr::new(10, 0, 0, 1))).await;
    let server = TestServerBuilder::new()
        .with_upstreams(vec![upstream.nameserver()])
        .start()
        .await;
    let client = TestClient::new(server.addr());

    let reply = client.query_udp(20, TestDomains::local_app(), RecordType::A).await;
    assert_eq!(TestClient::addresses(&reply), vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_nxdomain_is_relayed_then_served_as_servfail_from_cache() {
    let upstream = Upstream::start(UpstreamMode::NxDomain).await;
    let server = TestServerBuilder::new()
        .with_upstreams(vec![upstream.nameserver()])
        .start()
        .await;
    let client = TestClient::new(server.addr());

    let first = client.query_udp(30, TestDomains::nonexistent(), RecordType::A).await;
    assert_eq!(first.response_code(), ResponseCode::NXDomain);

    let second = client.query_udp(31, TestDomains::nonexistent(), RecordType::A).await;
    assert_eq!(second.id(), 31);
    assert_eq!(second.response_code(), ResponseCode::ServFail);
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn test_unsupported_type_is_servfail_without_forwarding() {
    let upstream = Upstream::start(UpstreamMode::Answer(Ipv4Addr::new(10, 0, 0, 1))).await;
    let server = TestServerBuilder::new()
        .with_upstreams(vec![upstream.nameserver()])
        .start()
        .await;
    let client = TestClient::new(server.addr());

    let reply = client.query_udp(40, TestDomains::example(), RecordType::MX).await;
    assert_eq!(reply.response_code(), ResponseCode::ServFail);
    assert_eq!(upstream.hits(), 0);
}
