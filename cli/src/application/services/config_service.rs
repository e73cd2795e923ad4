//! Application service: configuration use-cases.

use anyhow::{Result, bail};

use crate::application::ports::ConfigStore;
use crate::domain::config::RunwayConfig;
use crate::domain::error::ConfigError;

/// Environment variable that overrides the stored API token.
pub const TOKEN_ENV: &str = "RUNWAY_TOKEN";

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn load_config(store: &impl ConfigStore) -> Result<RunwayConfig> {
    store.load()
}

/// Load configuration with the token taken from `token_override` when given.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn load_effective_config(
    store: &impl ConfigStore,
    token_override: Option<String>,
) -> Result<RunwayConfig> {
    let mut config = store.load()?;
    if let Some(token) = token_override.filter(|t| !t.is_empty()) {
        config.remote.token = Some(token);
    }
    Ok(config)
}

/// Validate and persist one setting.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the store cannot be written.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<RunwayConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}

/// Resolve the workspace to operate on: the flag wins over the stored default.
///
/// # Errors
///
/// Returns an error if neither is set.
pub fn resolve_workspace(config: &RunwayConfig, flag: Option<&str>) -> Result<String> {
    match flag.or(config.defaults.workspace.as_deref()) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => bail!(ConfigError::MissingWorkspace),
    }
}

/// The configured organization.
///
/// # Errors
///
/// Returns an error if no organization is configured.
pub fn require_organization(config: &RunwayConfig) -> Result<String> {
    match config.remote.organization.as_deref() {
        Some(org) if !org.is_empty() => Ok(org.to_string()),
        _ => bail!(ConfigError::MissingOrganization),
    }
}
