//! # Relayer Configuration
//!
//! JSON file named by `RELAYER_CONFIG`, then `RELAYER_*` overrides.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `RELAYER_CONFIG` | Path of the JSON config file |
//! | `RELAYER_DEV_MODE` | Run against in-memory chains |
//! | `RELAYER_SOURCE_START_BLOCK` / `RELAYER_TARGET_START_BLOCK` | First scanned block |
//! | `RELAYER_SCAN_WINDOW` | Scan window on both sides |
//! | `RELAYER_POLL_INTERVAL_SECS` | Poll interval on both sides |
//! | `RELAYER_GENESIS_ROOT` | Genesis merkle root (`0x` hex) |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use bridge_sync::BridgeConfig;
use bridge_types::hex::parse_hash;

/// Complete relayer configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerConfig {
    /// Both bridge sides and the genesis snapshot.
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Use in-memory ledgers and store.
    #[serde(default)]
    pub dev_mode: bool,
}

impl RelayerConfig {
    /// Load from `RELAYER_CONFIG` (defaults when unset) and the process
    /// environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var("RELAYER_CONFIG").ok();
        Self::load_from(path.as_deref().map(Path::new), |key| std::env::var(key).ok())
    }

    /// Load from an optional file, reading overrides through `env`.
    pub fn load_from(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                let config: RelayerConfig = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?;
                info!("Loaded relayer config from {}", path.display());
                config
            }
            None => RelayerConfig::default(),
        };

        config.apply_overrides(env)?;
        config
            .bridge
            .validate()
            .context("Invalid bridge configuration")?;
        Ok(config)
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = env("RELAYER_DEV_MODE") {
            self.dev_mode = value.eq_ignore_ascii_case("true") || value == "1";
        }
        if let Some(block) = parse_u64(&env, "RELAYER_SOURCE_START_BLOCK")? {
            self.bridge.source.start_block = block;
        }
        if let Some(block) = parse_u64(&env, "RELAYER_TARGET_START_BLOCK")? {
            self.bridge.target.start_block = block;
        }
        if let Some(window) = parse_u64(&env, "RELAYER_SCAN_WINDOW")? {
            self.bridge.source.scan_window = window;
            self.bridge.target.scan_window = window;
        }
        if let Some(secs) = parse_u64(&env, "RELAYER_POLL_INTERVAL_SECS")? {
            self.bridge.source.poll_interval_secs = secs;
            self.bridge.target.poll_interval_secs = secs;
        }
        if let Some(root) = env("RELAYER_GENESIS_ROOT") {
            self.bridge.genesis.merkle_root =
                parse_hash(&root).context("RELAYER_GENESIS_ROOT must be a 32-byte hex value")?;
        }
        Ok(())
    }
}

fn parse_u64(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    env(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .with_context(|| format!("{key} must be an unsigned integer, got {value:?}"))
        })
        .transpose()
}
