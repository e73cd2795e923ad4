use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a remote run as reported by the run service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Planning,
    Planned,
    /// Plan finished and nothing further will happen (no changes or plan-only run).
    PlannedAndFinished,
    PolicyChecking,
    PolicySoftFailed,
    PolicyHardFailed,
    Confirming,
    Applying,
    Applied,
    Discarded,
    Errored,
    Canceled,
}

impl RunStatus {
    /// Returns `true` once the run service will not move the run any further.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::PlannedAndFinished
                | Self::Applied
                | Self::Discarded
                | Self::Errored
                | Self::Canceled
        )
    }

    /// Returns `true` while the run is parked waiting for a human decision.
    #[must_use]
    pub fn awaits_decision(self) -> bool {
        matches!(
            self,
            Self::Planned
                | Self::Confirming
                | Self::PolicySoftFailed
                | Self::PolicyHardFailed
        )
    }

    /// Wire name, e.g. `policy_soft_failed`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Planning => "planning",
            Self::Planned => "planned",
            Self::PlannedAndFinished => "planned_and_finished",
            Self::PolicyChecking => "policy_checking",
            Self::PolicySoftFailed => "policy_soft_failed",
            Self::PolicyHardFailed => "policy_hard_failed",
            Self::Confirming => "confirming",
            Self::Applying => "applying",
            Self::Applied => "applied",
            Self::Discarded => "discarded",
            Self::Errored => "errored",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource counts of a plan or an apply.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceChanges {
    pub additions: u32,
    pub changes: u32,
    pub destructions: u32,
}

impl ResourceChanges {
    #[must_use]
    pub fn new(additions: u32, changes: u32, destructions: u32) -> Self {
        Self {
            additions,
            changes,
            destructions,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.changes == 0 && self.destructions == 0
    }
}

/// Status of the policy evaluation attached to a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Pending,
    Passed,
    SoftFailed,
    HardFailed,
    Overridden,
    Errored,
}

/// Policy evaluation attached to a run once planning has finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyCheck {
    pub status: PolicyStatus,
    /// Aggregated verdict of all policies.
    pub result: bool,
    /// Human readable summary produced by the policy engine.
    #[serde(default)]
    pub description: String,
    /// Whether the caller may override a soft failure.
    #[serde(default)]
    pub can_override: bool,
}

/// Errors reported for a single resource by the remote worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceErrors {
    pub address: String,
    pub count: u32,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Snapshot of a run as returned by `GET /runs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub is_destroy: bool,
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<ResourceChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply: Option<ResourceChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyCheck>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResourceErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Run {
    /// A freshly queued run with nothing known about it yet.
    #[must_use]
    pub fn pending(id: impl Into<String>, is_destroy: bool) -> Self {
        Self {
            id: id.into(),
            status: RunStatus::Pending,
            is_destroy,
            has_changes: false,
            plan: None,
            apply: None,
            policy: None,
            errors: Vec::new(),
            created_at: None,
        }
    }

    /// Total number of resource errors reported for the run.
    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.errors.iter().map(|e| e.count).sum()
    }
}

/// Permissions the authenticated caller holds on a workspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspacePermissions {
    #[serde(default = "default_true")]
    pub can_queue_apply: bool,
    #[serde(default = "default_true")]
    pub can_override_policy: bool,
}

impl Default for WorkspacePermissions {
    fn default() -> Self {
        Self {
            can_queue_apply: true,
            can_override_policy: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Workspace as returned by `GET /organizations/{org}/workspaces/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// Runs are triggered by a connected VCS repository.
    #[serde(default)]
    pub vcs_connected: bool,
    /// Runs execute on the remote service (as opposed to locally).
    #[serde(default = "default_true")]
    pub operations: bool,
    #[serde(default)]
    pub auto_apply: bool,
    /// Run currently holding the workspace lock, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_run: Option<String>,
    #[serde(default)]
    pub permissions: WorkspacePermissions,
}

/// Configuration version created ahead of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationVersion {
    pub id: String,
    pub upload_url: String,
}

/// Body of `POST /runs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunCreate {
    pub workspace_id: String,
    pub configuration_version_id: String,
    pub is_destroy: bool,
    /// Plan-only run that can never be applied.
    #[serde(default)]
    pub speculative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of the run action endpoints (apply, discard, cancel).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
