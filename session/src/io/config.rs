//! Session configuration stored under `.session/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::window::SetupInfo;

/// Session configuration (TOML).
///
/// Edited by humans between sessions. Missing fields fall back to an
/// always-active setup with no reward cap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub setup: SetupInfo,
    pub params: SessionParams,
}

/// Per-session task parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionParams {
    /// Caps cumulative reward before the session counts as hydrated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reward: Option<f64>,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(max_reward) = self.params.max_reward {
            if !max_reward.is_finite() || max_reward <= 0.0 {
                return Err(anyhow!("params.max_reward must be > 0"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SessionConfig::default()`.
pub fn load_config(path: &Path) -> Result<SessionConfig> {
    if !path.exists() {
        return Ok(SessionConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SessionConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SessionConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
