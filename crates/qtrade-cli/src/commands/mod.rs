//! Command handler modules for qtrade-cli.

pub mod checkpoint;
pub mod config_hash;
pub mod run;

use anyhow::Result;
use qtrade_config::{ConfigMode, SessionConfig};

/// Parse a CLI `--mode` string into a [`ConfigMode`].
pub fn parse_config_mode(mode: &str) -> Result<ConfigMode> {
    match mode.trim().to_uppercase().as_str() {
        "BACKTEST" => Ok(ConfigMode::Backtest),
        "PAPER" => Ok(ConfigMode::Paper),
        "LIVE" => Ok(ConfigMode::Live),
        other => anyhow::bail!("invalid --mode '{}'. expected one of: BACKTEST | PAPER | LIVE", other),
    }
}

/// Load layered config files, warn or fail on unused keys depending on
/// mode, and deserialize into a [`SessionConfig`].
pub fn load_session_config(paths: &[String], mode: ConfigMode) -> Result<SessionConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = qtrade_config::load_layered_yaml(&path_refs)?;

    let policy = match mode {
        ConfigMode::Live => qtrade_config::UnusedKeyPolicy::Fail,
        ConfigMode::Paper | ConfigMode::Backtest => qtrade_config::UnusedKeyPolicy::Warn,
    };
    let report = qtrade_config::report_unused_keys(mode, &loaded.config_json, policy)?;
    if !report.is_clean() {
        for pointer in &report.unused_leaf_pointers {
            tracing::warn!(pointer = %pointer, "config key is not read by this mode");
        }
    }

    let cfg: SessionConfig = serde_json::from_value(loaded.config_json)?;
    tracing::info!(config_hash = %loaded.config_hash, "session config loaded");
    Ok(cfg)
}
