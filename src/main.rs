//! Headless match server (default binary).
//!
//! Binds the TCP adapter, seeds a fresh match, and runs the match loop
//! until the process is stopped. Configured entirely through `TUNNELCAT_*`
//! environment variables; see the adapter crate docs for the protocol.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tunnel_cat::adapter::{
    run_match_loop, run_server, InboundCommand, OutboundMessage, ServerConfig,
};
use tunnel_cat::core::Match;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let seed = config.seed.unwrap_or_else(seed_from_time);
    info!(seed, "starting match server");

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(config.max_pending_commands.max(1));
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

    tokio::spawn(run_match_loop(Match::new(seed), cmd_rx, out_tx));

    run_server(config, cmd_tx, out_rx, None).await
}

/// Millisecond clock truncated to 32 bits; enough to vary the shuffle
fn seed_from_time() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u32
}
