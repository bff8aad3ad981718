//! Analytics event relay server.
//!
//! Accepts application events over HTTP and forwards them asynchronously
//! to the analytics collection endpoint, so event producers never wait on
//! the remote sink.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use relay_core::events::event_channel;
use relay_core::processors::DeliveryLoop;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Analytics event relay - fire-and-forget event forwarding
#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./relay-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:8080)
    #[arg(short, long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting relay-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let loaded = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);
    tracing::info!(
        tracking_id = %loaded.client.tracking_id,
        app_name = %loaded.client.app_name,
        app_version = %loaded.client.app_version,
        collect_url = %loaded.collect_url,
        "Reporting identity configured"
    );

    // Wire the event queue: handlers produce, the delivery loop consumes.
    let (event_tx, event_rx) = event_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let delivery = DeliveryLoop::new(loaded.client, loaded.collect_url, event_rx, shutdown_rx);
    let delivery_handle = tokio::spawn(delivery.run());

    // Create application state
    let state = AppState::new(event_tx);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop the delivery loop once the HTTP server has drained. Events
    // still in the queue at this point are dropped, by design.
    let _ = shutdown_tx.send(true);
    let _ = delivery_handle.await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
