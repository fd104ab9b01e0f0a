//! Session configuration management.
//!
//! This module handles loading and saving the session configuration,
//! which includes the API base, the login path, and the redirect target
//! used by the route guard.
//!
//! Configuration is stored at `~/.config/sessionkit/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "sessionkit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API base. Relative, so it is resolved against `origin`.
pub const DEFAULT_DOMAIN: &str = "/api";

/// Default login path under the API base
pub const DEFAULT_AUTH_PATH: &str = "login";

/// Where unauthenticated users are sent
pub const DEFAULT_REDIRECT_URL: &str = "/login";

/// Name of the persisted credential slot
pub const DEFAULT_TOKEN_SLOT: &str = "authtoken";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub domain: String,
    pub auth_path: String,
    pub redirect_url: String,
    /// Scheme and host that a relative `domain` is resolved against
    pub origin: Option<String>,
    pub request_timeout_secs: u64,
    pub token_slot: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            origin: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_slot: DEFAULT_TOKEN_SLOT.to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Builder-style override for the origin a relative domain resolves against
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory used by the file-backed token store
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
