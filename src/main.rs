//! Carbon Chain Bridge
//!
//! Anchors emission records through an external chain service.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────┐
//!                     │                  CHAIN BRIDGE                     │
//!                     │                                                   │
//!  POST /onchain/     │  ┌──────────┐   ┌──────────────┐   ┌───────────┐  │   POST /send
//!  emissions/{id} ────┼─▶│ handlers │──▶│ orchestrator │──▶│  chain    │──┼──────────────▶ Chain
//!                     │  └──────────┘   └──────┬───────┘   │  client   │  │               Service
//!                     │                        │           └───────────┘  │                  │
//!                     │                        ▼                          │                  │
//!  GET /onchain/      │                 ┌──────────────┐                  │                  │
//!  emissions/{id} ────┼────────────────▶│ ledger store │◀─────┐           │                  │
//!                     │                 │   (SQLite)   │      │           │                  │
//!                     │                 └──────────────┘      │           │                  │
//!                     │                                ┌──────┴──────┐    │  PUT /onchain/   │
//!                     │                                │  callback   │◀───┼──────────────────┘
//!                     │                                │  receiver   │    │  callback
//!                     │                                └─────────────┘    │
//!                     └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use carbon_chain_bridge::config::load_config;
use carbon_chain_bridge::http::HttpServer;
use carbon_chain_bridge::lifecycle::{build_state, Shutdown};
use carbon_chain_bridge::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "carbon-chain-bridge")]
#[command(about = "Submits emission records to the chain service and reconciles callbacks")]
struct Args {
    /// Path to a TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("carbon-chain-bridge v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        chain_service = %config.chain_service.base_url,
        database = %config.database.path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let state = build_state(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
