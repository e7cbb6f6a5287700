//! User agent
//!
//! Registers a user with the coordinator, then drives an interactive loop
//! where arrays are requested by hand. The agent deregisters itself on the
//! way out, whether the session ends by command, end-of-input or Ctrl-C.

use crate::agent::client::CoordClient;
use crate::agent::listener;
use crate::common::proto::DssDescriptor;
use crate::common::{AgentConfig, Error, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct UserAgent {
    config: AgentConfig,
}

enum ReplOutcome {
    Continue,
    Deregistered,
}

impl UserAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        tracing::info!("Starting user agent: {}", self.config.name);
        tracing::info!("  Coordinator: {}", self.config.coordinator);

        let _management = listener::spawn("Management", &self.config.ip, self.config.mport).await?;
        let _command = listener::spawn("Command", &self.config.ip, self.config.cport).await?;

        let client = CoordClient::new(&self.config);
        client.register_user().await?;
        tracing::info!("✓ User {} registered", self.config.name);

        println!("Commands:");
        print_usage();

        let deregistered = self.repl(&client).await?;

        if !deregistered {
            if let Err(e) = client.deregister_user().await {
                tracing::warn!("deregistration refused: {}", e);
            }
        }
        Ok(())
    }

    async fn repl(&self, client: &CoordClient) -> Result<bool> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => match self.handle_line(client, line.trim()).await {
                            Ok(ReplOutcome::Continue) => {}
                            Ok(ReplOutcome::Deregistered) => return Ok(true),
                            Err(e) => println!("error: {}", e),
                        },
                        // End of input
                        None => return Ok(false),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    return Ok(false);
                }
            }
        }
    }

    async fn handle_line(&self, client: &CoordClient, line: &str) -> Result<ReplOutcome> {
        if line.is_empty() {
            return Ok(ReplOutcome::Continue);
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "configure-dss" => {
                if parts.len() != 4 {
                    println!("usage: configure-dss <name> <disks> <striping-unit>");
                    return Ok(ReplOutcome::Continue);
                }
                let n: usize = parts[2]
                    .parse()
                    .map_err(|_| Error::InvalidParams("disk count must be a number".into()))?;
                let striping_unit: u32 = parts[3]
                    .parse()
                    .map_err(|_| Error::InvalidParams("striping unit must be a number".into()))?;

                let descriptor = client.configure_dss(parts[1], n, striping_unit).await?;
                print_descriptor(&descriptor);
                Ok(ReplOutcome::Continue)
            }
            "deregister" => {
                client.deregister_user().await?;
                println!("✓ Deregistered {}", self.config.name);
                Ok(ReplOutcome::Deregistered)
            }
            "help" => {
                print_usage();
                Ok(ReplOutcome::Continue)
            }
            other => {
                println!("unknown command: {}", other);
                print_usage();
                Ok(ReplOutcome::Continue)
            }
        }
    }
}

fn print_usage() {
    println!("  configure-dss <name> <disks> <striping-unit>");
    println!("  deregister");
}

fn print_descriptor(descriptor: &DssDescriptor) {
    println!("✓ DSS {} configured", descriptor.dss_name);
    println!("  Disks: {}", descriptor.n);
    println!("  Striping unit: {} bytes", descriptor.striping_unit);
    for endpoint in &descriptor.disks {
        println!("    {} at {}:{}", endpoint.disk_name, endpoint.ip, endpoint.cport);
    }
}
