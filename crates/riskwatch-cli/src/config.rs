//! Config file discovery and environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use riskwatch_core::config::RiskConfig;

pub const CONFIG_FILE: &str = "riskwatch.toml";

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `riskwatch.toml` in the current directory
/// 2. `~/.config/riskwatch/config.toml`
///
/// Environment overrides: `RISKWATCH_DUE_SOON_DAYS`, `RISKWATCH_HISTORY_CAPACITY`.
pub fn load_config_from(path: Option<&Path>) -> Result<RiskConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            RiskConfig::from_toml_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => RiskConfig::default(),
    };

    if let Some(days) = env_override("RISKWATCH_DUE_SOON_DAYS")? {
        config.due_soon_days = days;
    }
    if let Some(capacity) = env_override("RISKWATCH_HISTORY_CAPACITY")? {
        config.history_capacity = capacity;
    }
    config.validate()?;

    Ok(config)
}

fn env_override<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("invalid value for {name}: '{raw}'")),
        Err(_) => Ok(None),
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("riskwatch"))
}
