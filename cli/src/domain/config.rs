//! Domain types and validators for Runway configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "remote.hostname",
    "remote.organization",
    "remote.token",
    "polling.interval_ms",
    "polling.max_failures",
    "defaults.workspace",
];

pub const DEFAULT_HOSTNAME: &str = "app.terraform.io";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.runway/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RunwayConfig {
    pub remote: RemoteConfig,
    pub polling: PollingConfig,
    pub defaults: DefaultsConfig,
}

/// Where the remote execution service lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            organization: None,
            token: None,
        }
    }
}

/// Status polling settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    /// Consecutive failed polls tolerated before giving up.
    pub max_failures: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_failures: 5,
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

impl RunwayConfig {
    /// Current value of a whitelisted key, for `config show`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "remote.hostname" => Some(self.remote.hostname.clone()),
            "remote.organization" => self.remote.organization.clone(),
            "remote.token" => self.remote.token.as_ref().map(|_| "********".to_string()),
            "polling.interval_ms" => Some(self.polling.interval_ms.to_string()),
            "polling.max_failures" => Some(self.polling.max_failures.to_string()),
            "defaults.workspace" => self.defaults.workspace.clone(),
            _ => None,
        }
    }

    /// Stores a value that already passed [`validate_config_value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "remote.hostname" => self.remote.hostname = value.to_string(),
            "remote.organization" => self.remote.organization = Some(value.to_string()),
            "remote.token" => self.remote.token = Some(value.to_string()),
            "polling.interval_ms" => self.polling.interval_ms = value.parse()?,
            "polling.max_failures" => self.polling.max_failures = value.parse()?,
            "defaults.workspace" => self.defaults.workspace = Some(value.to_string()),
            _ => {}
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match key {
        "remote.hostname" => {
            if value.is_empty() || value.contains("://") || value.contains('/') {
                return Err(invalid("Expected a bare hostname such as app.terraform.io").into());
            }
        }
        "polling.interval_ms" => match value.parse::<u64>() {
            Ok(ms) if ms >= 10 => {}
            _ => return Err(invalid("Expected a number of milliseconds, at least 10").into()),
        },
        "polling.max_failures" => match value.parse::<u32>() {
            Ok(n) if n >= 1 => {}
            _ => return Err(invalid("Expected a positive number").into()),
        },
        _ => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty").into());
            }
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
