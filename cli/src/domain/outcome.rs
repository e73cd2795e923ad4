//! Final result of an operation.

use crate::domain::error::OperationError;

/// Terminal verdict of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    Success,
    AppliedWithChanges,
    Failed,
    Canceled,
}

impl OperationResult {
    /// Process exit status: zero for both success results.
    #[must_use]
    pub fn exit_status(self) -> i32 {
        match self {
            Self::Success | Self::AppliedWithChanges => 0,
            Self::Failed | Self::Canceled => 1,
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self.exit_status() == 0
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::AppliedWithChanges => "applied_with_changes",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

/// Everything the caller learns once an operation completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub result: OperationResult,
    /// `false` when the run planned changes and did not fail.
    pub plan_empty: bool,
    pub run_id: Option<String>,
    pub error: Option<OperationError>,
}

impl OperationOutcome {
    /// A run that finished without error. `applied` is `false` for plans.
    #[must_use]
    pub fn success(run_id: Option<String>, has_changes: bool, applied: bool) -> Self {
        Self {
            result: if applied && has_changes {
                OperationResult::AppliedWithChanges
            } else {
                OperationResult::Success
            },
            plan_empty: !has_changes,
            run_id,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(run_id: Option<String>, error: OperationError) -> Self {
        let result = if error.is_cancellation() {
            OperationResult::Canceled
        } else {
            OperationResult::Failed
        };
        Self {
            result,
            plan_empty: true,
            run_id,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn exit_status(&self) -> i32 {
        self.result.exit_status()
    }
}
