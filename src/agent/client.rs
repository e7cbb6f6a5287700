//! Coordinator client
//!
//! Shared by the disk and user agents. Each call serializes one command,
//! fires it at the coordinator from a fresh ephemeral socket and waits for
//! the response that echoes its transaction id. Responses with a foreign
//! txid or undecodable bytes are skipped, not fatal; only the configured
//! timeout ends the wait.

use crate::common::proto::{
    self, AgentDescriptor, ConfigureDssPayload, DeregisterDiskPayload, DeregisterUserPayload,
    DssDescriptor, RegisterDiskPayload, RegisterUserPayload, Request, Response, CMD_CONFIGURE_DSS,
    CMD_DEREGISTER_DISK, CMD_DEREGISTER_USER, CMD_REGISTER_DISK, CMD_REGISTER_USER, MAX_DATAGRAM,
};
use crate::common::utils::new_txid;
use crate::common::{AgentConfig, Error, Result};
use serde::Serialize;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

pub struct CoordClient {
    coordinator: SocketAddr,
    from: AgentDescriptor,
    timeout: Duration,
}

impl CoordClient {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            coordinator: config.coordinator,
            from: AgentDescriptor {
                name: config.name.clone(),
                ip: config.ip.clone(),
                mport: config.mport,
                cport: config.cport,
            },
            timeout: config.request_timeout(),
        }
    }

    /// Send one command and wait for its correlated response.
    pub async fn call<P: Serialize>(&self, cmd: &str, payload: &P) -> Result<Response> {
        let txid = new_txid();
        let request = Request {
            cmd: cmd.to_string(),
            txid: txid.clone(),
            from: self.from.clone(),
            payload: serde_json::to_value(payload)
                .map_err(|e| Error::Internal(format!("encode payload: {}", e)))?,
        };
        let bytes = proto::encode_request(&request)?;

        let socket = UdpSocket::bind((self.from.ip.as_str(), 0)).await?;
        socket.send_to(&bytes, self.coordinator).await?;
        tracing::debug!("{} sent to {} (txid {})", cmd, self.coordinator, txid);

        let mut buf = vec![0u8; MAX_DATAGRAM];
        match tokio::time::timeout(self.timeout, recv_matching(&socket, &txid, &mut buf)).await {
            Ok(Ok(response)) => {
                tracing::debug!("{} answered (txid {}, ret {})", cmd, txid, response.ret);
                Ok(response)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::Timeout(format!(
                "{} to {} after {:?}",
                cmd, self.coordinator, self.timeout
            ))),
        }
    }

    pub async fn register_user(&self) -> Result<()> {
        self.call_checked(
            CMD_REGISTER_USER,
            &RegisterUserPayload {
                user_name: self.from.name.clone(),
                ip: self.from.ip.clone(),
                mport: self.from.mport,
                cport: self.from.cport,
            },
        )
        .await?;
        Ok(())
    }

    pub async fn deregister_user(&self) -> Result<()> {
        self.call_checked(
            CMD_DEREGISTER_USER,
            &DeregisterUserPayload {
                user_name: self.from.name.clone(),
            },
        )
        .await?;
        Ok(())
    }

    pub async fn register_disk(&self) -> Result<()> {
        self.call_checked(
            CMD_REGISTER_DISK,
            &RegisterDiskPayload {
                disk_name: self.from.name.clone(),
                ip: self.from.ip.clone(),
                mport: self.from.mport,
                cport: self.from.cport,
            },
        )
        .await?;
        Ok(())
    }

    pub async fn deregister_disk(&self) -> Result<()> {
        self.call_checked(
            CMD_DEREGISTER_DISK,
            &DeregisterDiskPayload {
                disk_name: self.from.name.clone(),
            },
        )
        .await?;
        Ok(())
    }

    pub async fn configure_dss(
        &self,
        dss_name: &str,
        n: usize,
        striping_unit: u32,
    ) -> Result<DssDescriptor> {
        let data = self
            .call_checked(
                CMD_CONFIGURE_DSS,
                &ConfigureDssPayload {
                    dss_name: dss_name.to_string(),
                    n,
                    striping_unit,
                },
            )
            .await?;
        data.ok_or_else(|| Error::MalformedMessage("configure-dss response carried no data".into()))
    }

    /// Call and fold a refusal into [`Error::RequestFailed`].
    async fn call_checked<P: Serialize>(
        &self,
        cmd: &str,
        payload: &P,
    ) -> Result<Option<DssDescriptor>> {
        let response = self.call(cmd, payload).await?;
        if response.is_success() {
            Ok(response.data)
        } else {
            Err(Error::RequestFailed {
                reason: response
                    .reason
                    .unwrap_or_else(|| "unspecified".to_string()),
            })
        }
    }
}

async fn recv_matching(socket: &UdpSocket, txid: &str, buf: &mut [u8]) -> Result<Response> {
    loop {
        let (len, peer) = socket.recv_from(buf).await?;
        match proto::decode_response(&buf[..len]) {
            Ok(response) if response.txid == txid => return Ok(response),
            Ok(response) => {
                tracing::debug!("ignoring response for txid {} from {}", response.txid, peer);
            }
            Err(e) => {
                tracing::debug!("ignoring undecodable datagram from {}: {}", peer, e);
            }
        }
    }
}
