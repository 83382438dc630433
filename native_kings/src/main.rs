//! Main entry point for the KAD-Kings room relay.

use native_kings::{cli, config, server};

use anyhow::Context;
use clap::Parser;
use config::Config;
use server::RelayState;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;

/// Usage:
///   kings-relay [--config PATH] [--port N] [--public-url URL] [--persist]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::RelayCli::parse();
    cli::init_tracing(cli.debug);

    let config_path: PathBuf = cli.config.clone();

    // Load or create config file (creates file if missing).
    let mut cfg = Config::load_or_create(&config_path)
        .with_context(|| format!("loading or creating config '{}'", config_path.display()))?;

    // Apply CLI overrides in-memory (non-persistent by default)
    if let Some(p) = cli.port {
        cfg.relay.port = p;
    }
    if let Some(url) = cli.public_url {
        cfg.relay.public_url = Some(url);
    }

    if cli.persist {
        cfg.save(&config_path)
            .with_context(|| format!("saving updated config '{}'", config_path.display()))?;
    }

    tracing::info!(config = %config_path.display(), ttl = cfg.relay.token_ttl_secs, max_room = cfg.relay.max_room_size);

    let wanted = cfg.relay.port;
    let port = find_available_port(wanted)
        .map_err(|e| anyhow::anyhow!("Could not find an available port: {}", e))?;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    if port != wanted {
        tracing::warn!(port, wanted, "configured port was not available, using alternative port");
    }

    let state = RelayState::new(cfg.relay);
    server::run_server(addr, state).await?;
    Ok(())
}

/// Find the first available port starting from the given port number
fn find_available_port(start_port: u16) -> anyhow::Result<u16> {
    let end = start_port.saturating_add(100);
    for port in start_port..end {
        if TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return Ok(port);
        }
    }
    Err(anyhow::anyhow!(
        "No available ports found in range {}..{}",
        start_port,
        end
    ))
}
