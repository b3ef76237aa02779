//! mpris-relay entry point: wires the watcher, poller, liveness monitor and
//! the WebSocket server around one shared context.

use std::{error::Error, net::SocketAddr, sync::Arc};

use clap::Parser;
use mpris_relay::{
    cli::{Cli, RelayConfig},
    context::ServerContext,
    mpris::{art::FileArtSource, poller::PositionPoller, watcher::PlaybackWatcher},
    server::{self, liveness::LivenessMonitor},
    tracing_config,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_config::init()?;

    let config = RelayConfig::from(Cli::parse());
    info!(player = %config.player, port = config.port, "Starting mpris-relay");

    let ctx = Arc::new(ServerContext::new(config, Box::new(FileArtSource)));

    let connection = zbus::Connection::session().await?;
    info!("D-Bus connection established");

    ctx.register_task(tokio::spawn(
        PlaybackWatcher::new(ctx.clone(), connection).run(),
    ));
    ctx.register_task(PositionPoller::new(ctx.clone()).spawn());
    ctx.register_task(
        LivenessMonitor::new(ctx.registry.clone(), ctx.config.liveness_period).spawn(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{addr}");

    let app = server::router(ctx.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown(ctx.clone()))
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C after tearing the relay down: the timers stop and
/// every live session is closed, so the listener can drain instead of
/// waiting on subscribers that never hang up.
async fn shutdown(ctx: Arc<ServerContext>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
    ctx.shutdown();
    ctx.registry.close_all().await;
}
