//! User agent binary

use clap::Parser;
use dstripe::common::{AgentConfig, DEFAULT_COORD_PORT};
use dstripe::UserAgent;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dstripe")]
#[command(about = "dstripe user agent")]
struct Args {
    /// User name, unique per coordinator
    #[arg(long)]
    name: String,

    /// Address this agent advertises and binds
    #[arg(long, default_value = "127.0.0.1")]
    ip: String,

    /// Management port
    #[arg(long)]
    mport: u16,

    /// Command port
    #[arg(long)]
    cport: u16,

    /// Coordinator address
    #[arg(long, default_value_t = default_coordinator())]
    coordinator: SocketAddr,

    /// Seconds to wait for a coordinator response
    #[arg(long, default_value = "5")]
    timeout: u64,
}

fn default_coordinator() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_COORD_PORT))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AgentConfig {
        name: args.name,
        ip: args.ip,
        mport: args.mport,
        cport: args.cport,
        coordinator: args.coordinator,
        request_timeout_secs: args.timeout,
    };

    UserAgent::new(config).run().await?;
    Ok(())
}
