//! CLI configuration loading.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/easytoolkit/transfer.toml`
//! - Windows: `%APPDATA%/easytoolkit/transfer.toml`

use std::path::{Path, PathBuf};

use anyhow::Context;
use easytoolkit_uploader::TransferConfig;

/// Loads `explicit` if given, else the platform config file.
///
/// A missing platform file yields defaults. An explicit path must exist.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<TransferConfig> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => (config_path(), false),
    };

    if !path.exists() {
        if required {
            anyhow::bail!("config file {} not found", path.display());
        }
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(TransferConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: TransferConfig =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Returns the platform-specific configuration file path.
fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("easytoolkit").join("transfer.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("easytoolkit")
            .join("transfer.toml")
    }
}
