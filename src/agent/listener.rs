//! Agent port listeners
//!
//! Every agent advertises a management port and a command port alongside
//! its registration. Striped data transfer happens outside the control
//! plane, so these listeners hold the claimed ports open and log whatever
//! arrives.

use crate::common::proto::MAX_DATAGRAM;
use crate::common::Result;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Bind one agent port and spawn a task that drains it. Failing to bind is
/// fatal for the agent; the ports it advertises must actually be its own.
pub async fn spawn(label: &'static str, ip: &str, port: u16) -> Result<JoinHandle<()>> {
    let socket = UdpSocket::bind((ip, port)).await?;
    let addr = socket.local_addr()?;
    tracing::info!("  {} port: {}", label, addr);

    Ok(tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, peer)) => {
                    tracing::debug!("{} received {} bytes from {}", label, len, peer);
                }
                Err(e) => {
                    tracing::warn!("{} recv error: {}", label, e);
                }
            }
        }
    }))
}
