//! Operation request options and their precondition checks.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use runway_common::Workspace;

use crate::domain::error::{OperationError, ValidationError};

/// Parallelism the remote worker always uses.
pub const DEFAULT_PARALLELISM: u32 = 10;

/// What the operation asks the remote worker to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Plan,
    Apply,
}

impl OperationKind {
    /// Lowercase verb used in headers, e.g. `apply`.
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Apply => "apply",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Plan => "Plan",
            Self::Apply => "Apply",
        }
    }

    #[must_use]
    pub fn gerund(self) -> &'static str {
        match self {
            Self::Plan => "Planning",
            Self::Apply => "Applying",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// A `key=value` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    /// Parses `name=value`. The value may itself contain `=`.
    ///
    /// # Errors
    ///
    /// Returns a message when `=` is missing or the name is empty.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => Ok(Self {
                name: name.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("invalid variable \"{raw}\": expected NAME=VALUE")),
        }
    }
}

/// Immutable description of one remote operation.
///
/// Built once through [`OperationSpecBuilder`]; the orchestrator never
/// mutates it after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub kind: OperationKind,
    pub workspace: String,
    pub destroy: bool,
    pub auto_approve: bool,
    pub parallelism: u32,
    pub refresh: bool,
    pub targets: Vec<String>,
    pub variables: Vec<Variable>,
    pub plan_file: Option<PathBuf>,
    /// Zero waits for the workspace lock indefinitely.
    pub lock_timeout: Duration,
    pub config_dir: PathBuf,
}

impl OperationSpec {
    #[must_use]
    pub fn builder(kind: OperationKind, workspace: impl Into<String>) -> OperationSpecBuilder {
        OperationSpecBuilder {
            spec: Self {
                kind,
                workspace: workspace.into(),
                destroy: false,
                auto_approve: false,
                parallelism: DEFAULT_PARALLELISM,
                refresh: true,
                targets: Vec::new(),
                variables: Vec::new(),
                plan_file: None,
                lock_timeout: Duration::ZERO,
                config_dir: PathBuf::from("."),
            },
        }
    }

    /// Returns `true` when the run may move past planning.
    #[must_use]
    pub fn applies(&self) -> bool {
        self.kind == OperationKind::Apply
    }
}

/// Builder for [`OperationSpec`].
#[derive(Debug, Clone)]
pub struct OperationSpecBuilder {
    spec: OperationSpec,
}

impl OperationSpecBuilder {
    #[must_use]
    pub fn destroy(mut self, destroy: bool) -> Self {
        self.spec.destroy = destroy;
        self
    }

    #[must_use]
    pub fn auto_approve(mut self, auto_approve: bool) -> Self {
        self.spec.auto_approve = auto_approve;
        self
    }

    #[must_use]
    pub fn parallelism(mut self, parallelism: u32) -> Self {
        self.spec.parallelism = parallelism;
        self
    }

    #[must_use]
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.spec.refresh = refresh;
        self
    }

    #[must_use]
    pub fn targets(mut self, targets: Vec<String>) -> Self {
        self.spec.targets = targets;
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: Vec<Variable>) -> Self {
        self.spec.variables = variables;
        self
    }

    #[must_use]
    pub fn plan_file(mut self, plan_file: Option<PathBuf>) -> Self {
        self.spec.plan_file = plan_file;
        self
    }

    #[must_use]
    pub fn lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.spec.lock_timeout = lock_timeout;
        self
    }

    #[must_use]
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spec.config_dir = dir.into();
        self
    }

    #[must_use]
    pub fn build(self) -> OperationSpec {
        self.spec
    }
}

/// Checks the request against what the workspace and remote service support.
///
/// Returns the first violated precondition; the order is fixed.
///
/// # Errors
///
/// Returns the [`OperationError`] for the first unsupported option.
pub fn validate(spec: &OperationSpec, workspace: &Workspace) -> Result<(), OperationError> {
    if workspace.vcs_connected {
        return Err(OperationError::VcsConflict(spec.kind));
    }
    if spec.parallelism != DEFAULT_PARALLELISM {
        return Err(ValidationError::Parallelism.into());
    }
    if spec.plan_file.is_some() {
        return Err(ValidationError::SavedPlan(spec.kind).into());
    }
    if !spec.refresh {
        return Err(ValidationError::NoRefresh(spec.kind).into());
    }
    if !spec.targets.is_empty() {
        return Err(ValidationError::Targeting.into());
    }
    if !spec.variables.is_empty() {
        return Err(ValidationError::Variables.into());
    }
    if !workspace.operations {
        return Err(ValidationError::OperationsDisabled(workspace.name.clone()).into());
    }
    if spec.applies() && !workspace.permissions.can_queue_apply {
        return Err(OperationError::Permission("apply changes".to_string()));
    }
    Ok(())
}
