//! Binary entry point: wires the dispatch engine to an HTTP/WebSocket
//! transport, since the engine's broadcast fabric needs a transport to
//! run over.

mod broadcast;
mod supervisor;
mod wire;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing::info;

use dispatch_core::config::Config;
use dispatch_core::generator::OrderGenerator;
use dispatch_core::hexgrid::HexGrid;
use dispatch_core::matching::{MatchMode, Matcher};
use dispatch_core::routing::RoutingClient;
use dispatch_core::store::{spawn_fleet, Store};

use broadcast::Hub;
use supervisor::Engine;

/// Real-time taxi dispatch simulator: matching loop, demand aggregation,
/// and a WebSocket broadcast fabric over a fixed fleet.
#[derive(Parser)]
#[command(name = "dispatch_server", about = "Taxi dispatch engine server")]
struct Cli {
    /// Address to bind the WebSocket listener on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Matcher cost function.
    #[arg(long, value_enum, default_value_t = CliMatchMode::Hybrid)]
    algorithm: CliMatchMode,

    /// Fleet size.
    #[arg(long, default_value_t = dispatch_core::config::DEFAULT_MAX_TAXIS)]
    max_taxis: usize,

    /// Enable the external routing provider (requires `--routing-credential`
    /// at least once). Without it, every assignment gets the deterministic
    /// straight-line fallback route.
    #[arg(long, default_value_t = false)]
    enable_routing: bool,

    /// Routing provider API credential; repeat for a rotation pool.
    #[arg(long = "routing-credential")]
    routing_credentials: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliMatchMode {
    Proximity,
    Demand,
    Hybrid,
}

impl From<CliMatchMode> for MatchMode {
    fn from(mode: CliMatchMode) -> Self {
        match mode {
            CliMatchMode::Proximity => MatchMode::Proximity,
            CliMatchMode::Demand => MatchMode::Demand,
            CliMatchMode::Hybrid => MatchMode::Hybrid,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::default()
        .with_match_mode(cli.algorithm.into())
        .with_max_taxis(cli.max_taxis);
    config.routing.enabled = cli.enable_routing;
    config.routing.credentials = cli.routing_credentials;
    let config = Arc::new(config);

    let store = Arc::new(Store::new(
        config.max_pending_orders,
        config.max_completed_orders,
    ));
    store.seed_taxis(spawn_fleet(&config)).await;
    info!(max_taxis = config.max_taxis, "fleet seeded");

    let grid = Arc::new(HexGrid::build(&config));
    info!(hex_count = grid.len(), "hex tiling built");

    let hub = Arc::new(Hub::new(Arc::clone(&store)));

    let engine = Engine {
        store,
        grid,
        matcher: Arc::new(Matcher::new(config.match_mode)),
        routing: Arc::new(RoutingClient::new(&config.routing)),
        generator: Arc::new(OrderGenerator::new(&config)),
        hub,
        config: Arc::clone(&config),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tasks = supervisor::spawn_supervisor(engine.clone(), shutdown_rx);

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("binding to {}", cli.bind))?;
    info!(bind = %cli.bind, "dispatch server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving dispatch server")?;

    let _ = shutdown_tx.send(true);
    for task in tasks {
        let _ = task.await;
    }
    info!("supervisor tasks stopped, exiting");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
