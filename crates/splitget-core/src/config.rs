//! Configuration loaded from `~/.config/splitget/config.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration. Every key is optional in the file; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitgetConfig {
    /// Number of byte ranges a transfer is split into when the CLI does not say otherwise.
    pub split_count: usize,
    /// Files smaller than this many bytes are fetched as a single range.
    pub min_split_bytes: u64,
    /// Buffer size used when concatenating chunk files into the destination.
    pub copy_buffer_bytes: usize,
    /// Cancel the remaining chunks as soon as one fails instead of waiting for all of them.
    pub fail_fast: bool,
    /// Override for the `User-Agent` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Connect timeout in seconds. No deadline when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for SplitgetConfig {
    fn default() -> Self {
        Self {
            split_count: 3,
            min_split_bytes: 5_120_000,
            copy_buffer_bytes: 1_024_000,
            fail_fast: false,
            user_agent: None,
            connect_timeout_secs: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("splitget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SplitgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SplitgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SplitgetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
