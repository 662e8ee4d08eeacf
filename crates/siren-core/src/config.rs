use crate::error::ErrorCode;
use crate::storage::{INCIDENTS_KEY, LoadPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SIREN_DATA_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SirenConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default)]
    pub on_corrupt: LoadPolicy,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            on_corrupt: LoadPolicy::default(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Reference point and spread for the simulated map position of new incidents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_reference_lat")]
    pub reference_lat: f64,
    #[serde(default = "default_reference_lng")]
    pub reference_lng: f64,
    /// Full width of the jitter window, in degrees, on each axis.
    #[serde(default = "default_jitter_span")]
    pub jitter_span: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            reference_lat: default_reference_lat(),
            reference_lng: default_reference_lng(),
            jitter_span: default_jitter_span(),
        }
    }
}

/// Resolve the data directory: explicit flag, then `SIREN_DATA_DIR`, then
/// the platform data dir (`~/.local/share/siren` on Linux).
pub fn resolve_data_dir(cli_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("siren"))
        .context("Could not determine a data directory; pass --data-dir")
}

fn read_config(path: &Path) -> Result<SirenConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<SirenConfig>(&content).with_context(|| {
        format!(
            "{}: failed to parse {}",
            ErrorCode::ConfigParseError.code(),
            path.display()
        )
    })
}

/// True when `err` came from malformed TOML rather than from reading the file.
#[must_use]
pub fn is_parse_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<toml::de::Error>().is_some()
}

/// Load `<data_dir>/config.toml`, else the user config
/// (`dirs::config_dir()/siren/config.toml`), else defaults.
pub fn load_config(data_dir: &Path) -> Result<SirenConfig> {
    let local = data_dir.join("config.toml");
    if local.exists() {
        return read_config(&local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user = config_dir.join("siren/config.toml");
        if user.exists() {
            return read_config(&user);
        }
    }

    Ok(SirenConfig::default())
}

fn default_key() -> String {
    INCIDENTS_KEY.to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

const fn default_reference_lat() -> f64 {
    4.6097
}

const fn default_reference_lng() -> f64 {
    -74.0817
}

const fn default_jitter_span() -> f64 {
    0.1
}
