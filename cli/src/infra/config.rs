//! YAML-file implementation of the `ConfigStore` port.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::application::ports::ConfigStore;
use crate::domain::config::RunwayConfig;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "RUNWAY_CONFIG";

/// Stores [`RunwayConfig`] as YAML, by default in `~/.runway/config.yaml`.
#[derive(Debug, Default, Clone)]
pub struct YamlConfigStore {
    fixed: Option<PathBuf>,
}

impl YamlConfigStore {
    /// A store bound to `path`, ignoring `RUNWAY_CONFIG` and the home directory.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            fixed: Some(path.into()),
        }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<RunwayConfig> {
        let path = self.path()?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(RunwayConfig::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(RunwayConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, config: &RunwayConfig) -> Result<()> {
        let path = self.path()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(config).context("cannot serialize config")?;
        fs::write(&path, yaml).with_context(|| format!("cannot write {}", path.display()))?;

        // May hold an API token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot restrict {}", path.display()))?;
        }
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.fixed {
            return Ok(path.clone());
        }
        if let Some(val) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(val));
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
        Ok(home.join(".runway").join("config.yaml"))
    }
}
