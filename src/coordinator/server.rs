//! Coordinator server
//!
//! One UDP socket, one task. Datagrams are handled strictly in arrival
//! order against a registry this loop owns outright, so every command is
//! atomic without a lock in sight.

use crate::common::proto::{self, MAX_DATAGRAM};
use crate::common::{CoordinatorConfig, Result};
use crate::coordinator::dispatcher;
use crate::coordinator::registry::Registry;
use tokio::net::UdpSocket;

pub struct Coordinator {
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting coordinator:");
        tracing::info!("  Bind address: {}", self.config.bind_addr);
        tracing::info!(
            "  Agent ports: {}..={}",
            self.config.policy.port_min,
            self.config.policy.port_max
        );
        tracing::info!("  Min disks per array: {}", self.config.policy.min_disks);
        tracing::info!(
            "  Striping unit: {}..={} bytes, power of two",
            self.config.policy.striping_unit_min,
            self.config.policy.striping_unit_max
        );

        let socket = UdpSocket::bind(self.config.bind_addr).await?;
        let registry = Registry::new(self.config.policy);

        tracing::info!("✓ Coordinator ready on {}", socket.local_addr()?);

        run(socket, registry).await
    }
}

/// Receive loop. Runs until the process is killed; per-datagram errors are
/// logged and never tear the loop down.
pub async fn run(socket: UdpSocket, mut registry: Registry) -> Result<()> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                tracing::error!("recv error: {}", e);
                continue;
            }
        };

        let request = match proto::decode_request(&buf[..len]) {
            Ok(request) => request,
            Err(e) => {
                // Not even an envelope; there is no txid to answer to
                tracing::warn!("dropping malformed datagram from {}: {}", peer, e);
                continue;
            }
        };

        let response = dispatcher::dispatch(&mut registry, request);
        let bytes = match proto::encode_response(&response) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("encoding response for {}: {}", peer, e);
                continue;
            }
        };
        if let Err(e) = socket.send_to(&bytes, peer).await {
            tracing::warn!("sending response to {}: {}", peer, e);
        }
    }
}
