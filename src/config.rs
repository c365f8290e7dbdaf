//! Relay configuration: optional TOML file overlaid with environment variables

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RelayError, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_CONFIG_PATH: &str = "relay_config.toml";
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RelayConfig {
    pub bind_address: String,
    pub delivery_timeout_secs: u64,
    pub log_dir: Option<PathBuf>,
    pub webhooks: WebhookUrls,
    pub build: BuildInfo,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            delivery_timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
            log_dir: None,
            webhooks: WebhookUrls::default(),
            build: BuildInfo::default(),
        }
    }
}

/// Discord webhook URLs, one per destination.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WebhookUrls {
    pub bug: Option<String>,
    pub feature: Option<String>,
    pub default: Option<String>,
}

/// Build metadata, only reported at startup.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BuildInfo {
    pub commit_hash: Option<String>,
    pub commit_message: Option<String>,
    pub commit_date: Option<String>,
    pub branch: Option<String>,
}

impl BuildInfo {
    pub fn is_empty(&self) -> bool {
        self.commit_hash.is_none()
            && self.commit_message.is_none()
            && self.commit_date.is_none()
            && self.branch.is_none()
    }
}

impl RelayConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    /// Overrides file values with whatever `lookup` returns for the known variables.
    /// Empty values count as unset.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Some(v) = get("DELIVERY_TIMEOUT_SECS") {
            self.delivery_timeout_secs = v.trim().parse().map_err(|e| {
                RelayError::ConfigError(format!("Invalid DELIVERY_TIMEOUT_SECS '{}': {}", v, e))
            })?;
        }
        if let Some(v) = get("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }

        override_opt(&mut self.webhooks.bug, get("DISCORD_WEBHOOK_BUG"));
        override_opt(&mut self.webhooks.feature, get("DISCORD_WEBHOOK_FEATURE"));
        override_opt(&mut self.webhooks.default, get("DISCORD_WEBHOOK_DEFAULT"));

        override_opt(&mut self.build.commit_hash, get("GIT_COMMIT_HASH"));
        override_opt(&mut self.build.commit_message, get("GIT_COMMIT_MESSAGE"));
        override_opt(&mut self.build.commit_date, get("GIT_COMMIT_DATE"));
        override_opt(&mut self.build.branch, get("GIT_BRANCH"));

        Ok(self)
    }
}

fn override_opt(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Parse a TOML configuration document.
pub fn parse_config(contents: &str) -> Result<RelayConfig> {
    Ok(toml::from_str(contents)?)
}

/// Load the configuration file at `path`, falling back to defaults when it does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<RelayConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(RelayConfig::default());
    }

    let config_str = std::fs::read_to_string(path).map_err(|e| {
        RelayError::ConfigError(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&config_str).map_err(|e| {
        RelayError::ConfigError(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Full startup load: the file named by `RELAY_CONFIG` (or the default path),
/// then the process environment on top.
pub fn load_from_env() -> Result<RelayConfig> {
    let path = std::env::var("RELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(&path)?.apply_env(|key| std::env::var(key).ok())
}
