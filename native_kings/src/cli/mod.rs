use clap::Parser;
use std::path::PathBuf;

/// CLI for the room relay
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kings-relay",
    version,
    about = "Room relay and token endpoint for KAD-Kings"
)]
pub struct RelayCli {
    /// Path to config file
    #[arg(long, default_value = "kings-relay.toml")]
    pub config: PathBuf,

    /// Port to listen on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Public base URL handed out with tokens (overrides config)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Persist CLI overrides back to the config file
    #[arg(long, default_value_t = false)]
    pub persist: bool,
}

/// Install the fmt subscriber. `RUST_LOG` wins over `debug`.
pub fn init_tracing(debug: bool) {
    // Our crates at info, everything else at warn, unless debugging.
    let log_filter = if debug {
        "debug".to_string()
    } else {
        "native_kings=info,kad_kings=info,kings_shared=info,warn".to_string()
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(debug)
        .with_thread_ids(debug)
        .with_file(debug)
        .with_line_number(debug)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let cli = RelayCli::parse_from(["kings-relay"]);
        assert_eq!(cli.config, PathBuf::from("kings-relay.toml"));
        assert!(cli.port.is_none() && !cli.debug && !cli.persist);

        let cli = RelayCli::parse_from(["kings-relay", "--port", "4000", "--persist", "--debug"]);
        assert_eq!(cli.port, Some(4000));
        assert!(cli.persist && cli.debug);
    }
}
