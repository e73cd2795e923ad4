//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared wire types,
//! and never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Result;
use futures_util::future::BoxFuture;
use runway_common::{ConfigurationVersion, Run, RunCreate, Workspace};

use crate::domain::{ConfigSnapshot, RemoteError, RunwayConfig};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Prompt id for the apply confirmation.
pub const PROMPT_APPROVE: &str = "approve";
/// Prompt id for overriding a soft-failed policy check.
pub const PROMPT_OVERRIDE: &str = "override";
/// Answer meaning "decide through another interface".
pub const WAIT_FOR_EXTERNAL_UPDATE: &str = "wait-for-external-update";

/// A question put to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Stable id, one of the `PROMPT_*` constants.
    pub id: &'static str,
    pub query: String,
    pub description: String,
}

impl Prompt {
    #[must_use]
    pub fn new(id: &'static str, query: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            query: query.into(),
            description: description.into(),
        }
    }
}

// ── Remote Execution Service ──────────────────────────────────────────────────

/// The remote service that executes runs.
///
/// Futures are `Send` so an operation can run on its own spawned task.
pub trait RemoteService: Send + Sync {
    /// Look up a workspace by name within the configured organization.
    fn read_workspace(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Workspace, RemoteError>> + Send;

    fn create_configuration_version(
        &self,
        workspace_id: &str,
    ) -> impl Future<Output = Result<ConfigurationVersion, RemoteError>> + Send;

    /// Upload the snapshot as the content of a configuration version.
    fn upload_configuration(
        &self,
        version: &ConfigurationVersion,
        snapshot: &ConfigSnapshot,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn create_run(&self, run: &RunCreate)
    -> impl Future<Output = Result<Run, RemoteError>> + Send;

    fn read_run(&self, run_id: &str) -> impl Future<Output = Result<Run, RemoteError>> + Send;

    fn apply_run(
        &self,
        run_id: &str,
        comment: Option<&str>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn discard_run(
        &self,
        run_id: &str,
        comment: Option<&str>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn cancel_run(
        &self,
        run_id: &str,
        comment: Option<&str>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn override_policy(&self, run_id: &str)
    -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Browser URL of a run, printed after submission.
    fn run_url(&self, workspace: &str, run_id: &str) -> String;
}

// ── Configuration Loader ──────────────────────────────────────────────────────

/// Collects the configuration files uploaded with a run.
pub trait ConfigLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    fn load(&self, dir: &Path) -> Result<ConfigSnapshot>;
}

// ── UI Sinks ──────────────────────────────────────────────────────────────────

/// Where progress lines go.
pub trait OutputSink: Send + Sync {
    fn output(&self, line: &str);
    fn error(&self, line: &str);
    fn flush(&self);
}

/// Where answers come from.
///
/// A dropped `ask` future must not consume an answer.
pub trait InputSink: Send + Sync {
    fn ask<'a>(&'a self, prompt: &'a Prompt) -> BoxFuture<'a, Result<String>>;
}

// ── Config Store Port ─────────────────────────────────────────────────────────

/// Abstracts config persistence so the service layer can be tested in isolation.
pub trait ConfigStore {
    /// Load the current configuration, returning defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<RunwayConfig>;

    /// Persist the configuration to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &RunwayConfig) -> Result<()>;

    /// Return the path to the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
