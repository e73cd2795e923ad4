//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error`.

use std::time::Duration;

use thiserror::Error;

use crate::domain::request::OperationKind;

// ── Validation errors ─────────────────────────────────────────────────────────

/// Request options the remote service does not support.
///
/// Raised before any remote call is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Custom parallelism values are currently not supported")]
    Parallelism,

    #[error("{} a saved plan is currently not supported", .0.gerund())]
    SavedPlan(OperationKind),

    #[error("{} without refresh is currently not supported", .0.gerund())]
    NoRefresh(OperationKind),

    #[error("Resource targeting is currently not supported")]
    Targeting,

    #[error("Run variables are currently not supported")]
    Variables,

    #[error("Remote operations are disabled for workspace \"{0}\"")]
    OperationsDisabled(String),
}

impl ValidationError {
    /// Longer explanation shown under the one-line error.
    #[must_use]
    pub fn detail(&self) -> &'static str {
        match self {
            Self::Parallelism => {
                "The remote backend does not support setting a custom parallelism value at this time."
            }
            Self::SavedPlan(_) => {
                "The remote backend only supports runs that create their plan remotely."
            }
            Self::NoRefresh(_) => {
                "Currently the remote backend will always do a refresh of the state prior to planning."
            }
            Self::Targeting => {
                "The remote backend does not support resource targeting at this time."
            }
            Self::Variables => {
                "Run variables must be set on the workspace itself at this time."
            }
            Self::OperationsDisabled(_) => {
                "The workspace is configured for local execution, which runway does not perform."
            }
        }
    }
}

// ── Remote adapter errors ─────────────────────────────────────────────────────

/// Errors returned by a remote service adapter.
///
/// Only [`RemoteError::Unavailable`] is considered transient.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote service unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl RemoteError {
    /// Returns `true` when retrying the same call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// ── Operation errors ──────────────────────────────────────────────────────────

/// Terminal failure of a remote operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{} not allowed for workspaces with a VCS connection.", .0.title())]
    VcsConflict(OperationKind),

    #[error("{0}")]
    Submission(String),

    #[error("Remote service unavailable after {attempts} consecutive failures: {reason}")]
    RemoteUnavailable { attempts: u32, reason: String },

    #[error("Insufficient rights to {0}")]
    Permission(String),

    #[error("Permission denied by the remote service: {0}")]
    Denied(String),

    #[error("Apply discarded.")]
    ApplyDiscarded { external: bool },

    #[error("Policy check soft failed.")]
    PolicySoftFail,

    #[error("Policy check hard failed.")]
    PolicyHardFail,

    #[error("Lock timeout exceeded after {}s.", .0.as_secs())]
    LockTimeout(Duration),

    #[error("Run errored with {0} resource error(s).")]
    RemoteRun(u32),

    #[error("Operation canceled.")]
    Canceled,

    #[error("Run canceled using the UI or API.")]
    RemoteCanceled,

    #[error("Remote service rejected the request: {0}")]
    Remote(String),

    #[error("Failed to read input: {0}")]
    Input(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OperationError {
    /// Short category label printed in front of the error line.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::VcsConflict(_) => "vcs",
            Self::Submission(_) => "submission",
            Self::RemoteUnavailable { .. } => "unavailable",
            Self::Permission(_) | Self::Denied(_) => "permission",
            Self::ApplyDiscarded { .. } => "discarded",
            Self::PolicySoftFail | Self::PolicyHardFail => "policy",
            Self::LockTimeout(_) => "lock",
            Self::RemoteRun(_) => "run",
            Self::Canceled | Self::RemoteCanceled => "canceled",
            Self::Remote(_) => "remote",
            Self::Input(_) => "input",
            Self::Internal(_) => "internal",
        }
    }

    /// Optional explanation shown under the error line.
    #[must_use]
    pub fn detail(&self) -> Option<&'static str> {
        match self {
            Self::Validation(v) => Some(v.detail()),
            Self::VcsConflict(_) => Some(
                "A workspace that is connected to a VCS requires the VCS-driven workflow \
to ensure that the VCS remains the single source of truth.",
            ),
            Self::PolicySoftFail => Some(
                "The run stopped because an organization policy soft failed and was not overridden.",
            ),
            Self::LockTimeout(_) => Some(
                "Another run held the workspace lock for longer than the configured lock timeout.",
            ),
            _ => None,
        }
    }

    /// Returns `true` for failures caused by cancellation rather than an error.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::RemoteCanceled)
    }
}

impl From<RemoteError> for OperationError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::PermissionDenied(reason) => Self::Denied(reason),
            RemoteError::Unavailable(reason) => Self::RemoteUnavailable {
                attempts: 1,
                reason,
            },
            other => Self::Remote(other.to_string()),
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("No organization configured. Set one with: runway config set remote.organization <name>")]
    MissingOrganization,

    #[error("No workspace given. Pass --workspace or run: runway config set defaults.workspace <name>")]
    MissingWorkspace,
}
