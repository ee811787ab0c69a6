//! Configuration Management
//!
//! Handles connection settings for siem-sync. Values come from a YAML file
//! and can be overridden from the command line.

use crate::siem::auth::Credentials;
use crate::siem::client::{ConnectionSettings, DEFAULT_BASE_PATH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_USER: &str = "elastic";
const DEFAULT_PASSWORD: &str = "elastic";

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SIEM host name
    pub hostname: String,
    pub port: u16,
    /// Connect with TLS or unencrypted
    pub tls: bool,
    pub user: String,
    pub password: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub base_path: String,
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Where tracked resources are persisted
    pub state_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 443,
            tls: true,
            user: DEFAULT_USER.to_string(),
            password: None,
            timeout_secs: 10,
            base_path: DEFAULT_BASE_PATH.to_string(),
            headers: BTreeMap::new(),
            state_file: None,
        }
    }
}

impl Config {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("siem-sync"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.yaml"))
    }

    /// Load configuration from the default location.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get effective password (config > default)
    pub fn effective_password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }

    /// Get effective state file (config > config dir > working directory)
    pub fn effective_state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .or_else(|| Self::config_dir().map(|p| p.join("state.json")))
            .unwrap_or_else(|| PathBuf::from("siem-sync.state.json"))
    }

    /// Connection settings for the SIEM client
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            hostname: self.hostname.clone(),
            port: self.port,
            use_tls: self.tls,
            credentials: Some(Credentials::new(&self.user, self.effective_password())),
            base_path: self.base_path.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            headers: self.headers.clone(),
        }
    }
}
