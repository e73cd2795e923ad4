//! Run status transition table.
//!
//! Each observed status change maps to the ordered steps the poller takes.
//! Steps that were skipped because several statuses passed between two polls
//! are still produced, so a run seen going straight from `planning` to
//! `applied` reports its plan before its apply.

use runway_common::RunStatus;

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Planned,
    Applied,
    Discarded,
    Errored,
    Canceled,
}

/// Action the poller performs for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Print the plan summary. Idempotent: the poller prints it once.
    ReportPlan,
    /// Evaluate the policy verdict once it exists.
    EvaluatePolicy,
    /// Drive the approve/discard decision.
    Confirm,
    /// Print the apply summary.
    ReportApply,
    Finish(RunEnd),
}

/// Steps for a change from `previous` (`None` before the first poll) to `next`.
#[must_use]
pub fn transition(previous: Option<RunStatus>, next: RunStatus) -> &'static [Step] {
    use RunEnd as E;
    use RunStatus as S;
    use Step::{Confirm, EvaluatePolicy, Finish, ReportApply, ReportPlan};

    if previous == Some(next) || previous.is_some_and(RunStatus::is_terminal) {
        return &[];
    }
    match next {
        S::Pending | S::Planning => &[],
        S::Planned | S::PolicyChecking => &[ReportPlan],
        S::PolicySoftFailed | S::PolicyHardFailed | S::Applying => &[ReportPlan, EvaluatePolicy],
        S::Confirming => &[ReportPlan, EvaluatePolicy, Confirm],
        S::PlannedAndFinished => &[ReportPlan, EvaluatePolicy, Finish(E::Planned)],
        S::Applied => &[ReportPlan, EvaluatePolicy, ReportApply, Finish(E::Applied)],
        S::Discarded => &[Finish(E::Discarded)],
        S::Errored => &[ReportPlan, Finish(E::Errored)],
        S::Canceled => &[Finish(E::Canceled)],
    }
}
