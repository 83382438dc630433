use anyhow::{Context, Result};
use kad_kings::TableRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for the development room relay.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    pub port: u16,
    /// How long an issued token stays redeemable.
    pub token_ttl_secs: u64,
    /// Members allowed in one room, seated or not.
    pub max_room_size: usize,
    /// Base URL handed out with tokens, e.g. `wss://kings.example.org`.
    /// When unset, the request's `Host` header is used.
    pub public_url: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            port: 3000,
            token_ttl_secs: 60,
            max_room_size: 12,
            public_url: None,
        }
    }
}

/// Settings for a native peer such as `kings-cli`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PeerConfig {
    /// Base URL of the token endpoint.
    pub relay: String,
    pub room: String,
    pub name: Option<String>,
    /// Host tick interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for PeerConfig {
    fn default() -> Self {
        PeerConfig {
            relay: "http://localhost:3000".into(),
            room: "kings".into(),
            name: None,
            tick_ms: 500,
        }
    }
}

/// Configuration persisted as TOML.
///
/// Sections:
/// - `[relay]`: the room relay and token endpoint
/// - `[peer]`: where and as whom a native peer joins
/// - `[table]`: rules the host enforces
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub relay: RelayConfig,
    pub peer: PeerConfig,
    pub table: TableRules,
}

impl Config {
    /// Load configuration from `path`. If the file does not exist, create it
    /// with defaults and return those.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)
                .with_context(|| format!("reading config file '{}'", path.display()))?;
            let cfg: Config = toml::from_str(&s)
                .with_context(|| format!("parsing TOML config '{}'", path.display()))?;
            Ok(cfg)
        } else {
            let cfg = Config::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Write the config to `path`, overwriting it.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating config directory '{}'", parent.display()))?;
            }
        }
        let toml_text =
            toml::to_string_pretty(&self).with_context(|| "serializing config to TOML")?;
        fs::write(path, toml_text)
            .with_context(|| format!("writing config to '{}'", path.display()))?;
        Ok(())
    }
}
