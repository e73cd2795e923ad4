//! Application context: unified state passed to every command handler.

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::application::services::config_service::{self, TOKEN_ENV};
use crate::application::services::operation::{Orchestrator, OrchestratorSettings};
use crate::domain::RunwayConfig;
use crate::infra::config::YamlConfigStore;
use crate::infra::config_loader::DirConfigLoader;
use crate::infra::remote_http::HttpRemote;
use crate::output::OutputContext;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Print results as JSON.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode, JSON mode).
    pub output: OutputContext,
    /// Persistent configuration.
    pub config_store: YamlConfigStore,
    /// Shell interrupt token: cancelled by Ctrl-C and by a lock timeout.
    pub interrupt: CancellationToken,
    /// Never prompt. Set when the `CI` environment variable is present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet, flags.json),
            config_store: YamlConfigStore::default(),
            interrupt: CancellationToken::new(),
            non_interactive: std::env::var_os("CI").is_some(),
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.output.json
    }

    /// Stored configuration with `RUNWAY_TOKEN` applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn config(&self) -> Result<RunwayConfig> {
        config_service::load_effective_config(&self.config_store, std::env::var(TOKEN_ENV).ok())
    }

    /// Orchestrator wired to the configured remote service.
    ///
    /// # Errors
    ///
    /// Returns an error if no organization is configured or the HTTP client
    /// cannot be built.
    pub fn orchestrator(
        &self,
        config: &RunwayConfig,
    ) -> Result<Orchestrator<HttpRemote, DirConfigLoader>> {
        let organization = config_service::require_organization(config)?;
        if config.remote.token.is_none() {
            tracing::warn!("no API token configured, requests will be unauthenticated");
        }
        let remote = HttpRemote::new(
            &config.remote.hostname,
            &organization,
            config.remote.token.clone(),
        )?;
        Ok(Orchestrator::new(
            Arc::new(remote),
            Arc::new(DirConfigLoader),
            OrchestratorSettings::from(config.polling),
        )
        .with_interrupt(self.interrupt.clone()))
    }
}
