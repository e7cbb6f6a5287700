//! Disk agent
//!
//! Advertises one disk to the coordinator and keeps its two ports open
//! until shutdown. Registration retries while the coordinator is still
//! coming up. Shutdown sends a best-effort deregistration; for a disk
//! committed to an array the coordinator refuses it, and the agent just
//! reports that.

use crate::agent::client::CoordClient;
use crate::agent::listener;
use crate::common::utils::retry_with_backoff;
use crate::common::{AgentConfig, Result};
use std::time::Duration;

pub struct DiskAgent {
    config: AgentConfig,
}

impl DiskAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!("Starting disk agent: {}", self.config.name);
        tracing::info!("  Coordinator: {}", self.config.coordinator);

        let _management = listener::spawn("Management", &self.config.ip, self.config.mport).await?;
        let _command = listener::spawn("Command", &self.config.ip, self.config.cport).await?;

        let client = CoordClient::new(&self.config);
        retry_with_backoff(|| client.register_disk(), 3, Duration::from_millis(500)).await?;
        tracing::info!("✓ Disk {} registered, awaiting allocation", self.config.name);

        tokio::signal::ctrl_c().await?;

        tracing::info!("Deregistering disk {}", self.config.name);
        if let Err(e) = client.deregister_disk().await {
            tracing::warn!("deregistration refused: {}", e);
        }
        Ok(())
    }
}
