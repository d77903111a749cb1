//! Configuration loading
//!
//! The service reads a single TOML file. The file location is resolved in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. `GUILDDIR_CONFIG` environment variable
//! 3. `guilddir.toml` in the working directory (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "GUILDDIR_CONFIG";

/// Default config file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "guilddir.toml";

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub listen: ListenConfig,
    pub content: ContentConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// HTTP listen address for the admin API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Directory content sources: optional local override plus the remote
/// repository file that is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Operator-supplied override file; tried before the remote source
    #[serde(default)]
    pub local_override: Option<PathBuf>,
    pub remote: RemoteConfig,
}

/// Remote content source: a file inside a hosted repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Repository-relative path of the directory JSON
    pub path: String,
}

/// Invite validation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Delay before validation when reconciling at process startup.
    /// Avoids racing the external service's own start-up throttling.
    #[serde(default = "default_startup_delay")]
    pub startup_delay_secs: u64,
    /// Delay before validation on a manual refresh
    #[serde(default = "default_refresh_delay")]
    pub refresh_delay_secs: u64,
    /// Per-request timeout against the invite resolution service
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            startup_delay_secs: default_startup_delay(),
            refresh_delay_secs: default_refresh_delay(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Operational notification channel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Webhook receiving duplicate reports and removal diagnostics.
    /// When unset, diagnostics go to the log only.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_startup_delay() -> u64 {
    60
}

fn default_refresh_delay() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

/// Resolve the config file path following the priority order above
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Load and parse the service configuration
pub fn load_config(path: &Path) -> Result<ServiceConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&text).map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))
}
