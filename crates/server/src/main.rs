//! Headless arena simulation server.

use server::Config;
use tokio::sync::mpsc;
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Arena simulation server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  World: {}x{}", config.world.width, config.world.height);
    info!("  Target mass: {}", config.world.target_mass);
    info!(
        "  Food: {} max, viruses: {} max",
        config.food.max_amount, config.virus.max_amount
    );

    // The transport collaborator owns the command sender and the outbound receiver.
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

    let core = tokio::spawn(server::run(config, command_rx, outbound_tx));
    let drain = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            trace!(room = %event.room, target = ?event.target, "{:?}", event.event);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    drop(command_tx);

    core.await??;
    drain.await?;
    Ok(())
}
