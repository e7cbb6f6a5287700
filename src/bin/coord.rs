//! Coordinator binary

use clap::{Parser, Subcommand};
use dstripe::{common::CoordinatorConfig, Coordinator};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dstripe-coord")]
#[command(about = "dstripe coordinator for striped storage arrays")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start coordinator server
    Serve {
        /// Bind address for the control plane
        #[arg(long)]
        bind: Option<String>,

        /// Config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, config } => {
            // Load config from file and environment, then let CLI win
            let mut coord_config = CoordinatorConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                coord_config.bind_addr = bind.parse()?;
            }

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&coord_config.log_level)),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            let coord = Coordinator::new(coord_config);
            coord.serve().await?;
        }
    }

    Ok(())
}
