use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "kings-cli", version, about = "Headless KAD-Kings player", long_about = None)]
pub struct Cli {
    /// Display name, which is also your identity in the room
    #[arg(short, long)]
    pub name: Option<String>,

    /// Room to join
    #[arg(short, long)]
    pub room: Option<String>,

    /// Base URL of the relay's token endpoint (e.g. http://localhost:3000)
    #[arg(long)]
    pub relay: Option<String>,

    /// Path to config file
    #[arg(long, default_value = "kings-cli.toml")]
    pub config: PathBuf,

    /// Persist CLI overrides back to the config file
    #[arg(long, default_value_t = false)]
    pub persist: bool,

    /// Plain output even on a terminal
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Verbose logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
