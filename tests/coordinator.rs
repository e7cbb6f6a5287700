//! Coordinator wire tests: registration, allocation and failure answers

use dstripe::common::proto::{self, Response};
use dstripe::common::Policy;
use dstripe::coordinator::{server, Registry};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Spawn a coordinator loop on an ephemeral port.
async fn start_coordinator() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let registry = Registry::new(Policy::default());
    tokio::spawn(server::run(socket, registry));
    addr
}

struct TestClient {
    socket: UdpSocket,
    coordinator: SocketAddr,
}

impl TestClient {
    async fn connect(coordinator: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        Self {
            socket,
            coordinator,
        }
    }

    async fn send_raw(&self, bytes: &[u8]) {
        self.socket.send_to(bytes, self.coordinator).await.unwrap();
    }

    async fn request(&self, cmd: &str, txid: &str, payload: Value) -> Response {
        let envelope = json!({
            "cmd": cmd,
            "txid": txid,
            "from": {"name": "test", "ip": "127.0.0.1", "mport": 2500, "cport": 2501},
            "payload": payload,
        });
        self.send_raw(&serde_json::to_vec(&envelope).unwrap()).await;
        self.recv().await.expect("coordinator sent no response")
    }

    async fn recv(&self) -> Option<Response> {
        let mut buf = vec![0u8; 65535];
        match tokio::time::timeout(Duration::from_secs(2), self.socket.recv_from(&mut buf)).await {
            Ok(Ok((len, _))) => Some(proto::decode_response(&buf[..len]).unwrap()),
            _ => None,
        }
    }

    async fn register_disk(&self, name: &str, mport: u16, cport: u16) -> Response {
        self.request(
            "register-disk",
            &format!("reg-{}", name),
            json!({"disk_name": name, "ip": "127.0.0.1", "mport": mport, "cport": cport}),
        )
        .await
    }
}

#[tokio::test]
async fn test_register_disk_and_duplicate() {
    let coordinator = start_coordinator().await;
    let client = TestClient::connect(coordinator).await;

    let response = client.register_disk("d1", 2510, 2511).await;
    assert_eq!(response.txid, "reg-d1");
    assert_eq!(response.ret, 0);
    assert!(response.reason.is_none());

    let response = client.register_disk("d1", 2520, 2521).await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("duplicate-name"));
}

#[tokio::test]
async fn test_port_conflict_across_kinds() {
    let coordinator = start_coordinator().await;
    let client = TestClient::connect(coordinator).await;

    let response = client
        .request(
            "register-user",
            "t1",
            json!({"user_name": "alice", "ip": "127.0.0.1", "mport": 2600, "cport": 2601}),
        )
        .await;
    assert_eq!(response.ret, 0);

    // A disk claiming alice's command port is refused
    let response = client.register_disk("d9", 2601, 2610).await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("port-conflict"));
}

#[tokio::test]
async fn test_invalid_requests_still_get_answers() {
    let coordinator = start_coordinator().await;
    let client = TestClient::connect(coordinator).await;

    // Unknown command
    let response = client.request("destroy-dss", "t1", json!({})).await;
    assert_eq!(response.txid, "t1");
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("invalid-params"));

    // Payload missing fields
    let response = client
        .request("register-user", "t2", json!({"user_name": "alice"}))
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("invalid-params"));

    // Port outside the 2500..=2999 range
    let response = client
        .request(
            "register-user",
            "t3",
            json!({"user_name": "alice", "ip": "127.0.0.1", "mport": 2400, "cport": 2601}),
        )
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("invalid-params"));

    // Envelope without a txid is answered with the placeholder
    client
        .send_raw(br#"{"cmd": "register-user", "payload": {}}"#)
        .await;
    let response = client.recv().await.unwrap();
    assert_eq!(response.txid, "-");
    assert_eq!(response.ret, 1);
}

#[tokio::test]
async fn test_malformed_datagram_gets_no_response() {
    let coordinator = start_coordinator().await;
    let client = TestClient::connect(coordinator).await;

    client.send_raw(b"this is not json").await;
    assert!(client.recv().await.is_none());

    // The loop survives and keeps serving
    let response = client.register_disk("d1", 2510, 2511).await;
    assert_eq!(response.ret, 0);
}

#[tokio::test]
async fn test_deregister_unknown_names() {
    let coordinator = start_coordinator().await;
    let client = TestClient::connect(coordinator).await;

    let response = client
        .request("deregister-user", "t1", json!({"user_name": "ghost"}))
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("username-not-found"));

    let response = client
        .request("deregister-disk", "t2", json!({"disk_name": "ghost"}))
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("diskname-not-found"));
}

#[tokio::test]
async fn test_configure_dss_validation_order() {
    let coordinator = start_coordinator().await;
    let client = TestClient::connect(coordinator).await;

    // Parameter checks run before any disk is touched, so an empty registry
    // still answers invalid-params for bad parameters
    for payload in [
        json!({"dss_name": "arrayA", "n": 2, "striping_unit": 4096}),
        json!({"dss_name": "arrayA", "n": 3, "striping_unit": 1000}),
        json!({"dss_name": "arrayA", "n": 3, "striping_unit": 127}),
        json!({"dss_name": "arrayA", "n": 3, "striping_unit": 1048576}),
        json!({"dss_name": "", "n": 3, "striping_unit": 4096}),
    ] {
        let response = client.request("configure-dss", "t1", payload).await;
        assert_eq!(response.ret, 1);
        assert_eq!(response.reason.as_deref(), Some("invalid-params"));
    }

    // With parameters fine but no disks at all, the shortage is reported
    let response = client
        .request(
            "configure-dss",
            "t2",
            json!({"dss_name": "arrayA", "n": 3, "striping_unit": 4096}),
        )
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("insufficient-disks"));
}

#[tokio::test]
async fn test_configure_dss_end_to_end() {
    let coordinator = start_coordinator().await;
    let client = TestClient::connect(coordinator).await;

    // Five disks and one user
    for i in 0..5u16 {
        let response = client
            .register_disk(&format!("d{}", i + 1), 2510 + 2 * i, 2511 + 2 * i)
            .await;
        assert_eq!(response.ret, 0);
    }
    let response = client
        .request(
            "register-user",
            "t0",
            json!({"user_name": "alice", "ip": "127.0.0.1", "mport": 2600, "cport": 2601}),
        )
        .await;
    assert_eq!(response.ret, 0);

    // arrayA takes three of the five
    let response = client
        .request(
            "configure-dss",
            "t1",
            json!({"dss_name": "arrayA", "n": 3, "striping_unit": 4096}),
        )
        .await;
    assert_eq!(response.ret, 0);
    let descriptor = response.data.expect("configure-dss success carries data");
    assert_eq!(descriptor.dss_name, "arrayA");
    assert_eq!(descriptor.n, 3);
    assert_eq!(descriptor.striping_unit, 4096);

    let all: HashSet<String> = (1..=5).map(|i| format!("d{}", i)).collect();
    let members: HashSet<String> = descriptor
        .disks
        .iter()
        .map(|d| d.disk_name.clone())
        .collect();
    assert_eq!(members.len(), 3);
    assert!(members.is_subset(&all));

    // Same name: refused before looking at the pool
    let response = client
        .request(
            "configure-dss",
            "t2",
            json!({"dss_name": "arrayA", "n": 3, "striping_unit": 4096}),
        )
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("dss-exist"));

    // Two free disks cannot form a second array of three
    let response = client
        .request(
            "configure-dss",
            "t3",
            json!({"dss_name": "arrayB", "n": 3, "striping_unit": 4096}),
        )
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("insufficient-disks"));

    // A committed member cannot leave
    let member = descriptor.disks[0].disk_name.clone();
    let response = client
        .request("deregister-disk", "t4", json!({"disk_name": member}))
        .await;
    assert_eq!(response.ret, 1);
    assert_eq!(response.reason.as_deref(), Some("disk-in-dss"));

    // A free disk can, and its ports become claimable again
    let free = all.difference(&members).next().unwrap().clone();
    let index: u16 = free[1..].parse::<u16>().unwrap() - 1;
    let response = client
        .request("deregister-disk", "t5", json!({"disk_name": free}))
        .await;
    assert_eq!(response.ret, 0);

    let response = client
        .register_disk("d-reborn", 2510 + 2 * index, 2511 + 2 * index)
        .await;
    assert_eq!(response.ret, 0);
}
