//! Status polling and dispatch of transition steps.

use runway_common::{Run, RunStatus, Workspace};

use super::lock::{LockWait, QueueSlot};
use super::{Completion, OperationContext, confirm, policy};
use crate::application::ports::{ConfigLoader, RemoteService};
use crate::domain::summary::{self, EXTERNAL_DISCARD};
use crate::domain::{OperationError, PolicyOutcome, RunEnd, Step, transition};

/// Follows the run until it ends, acting on each status change in order.
pub(super) async fn follow<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    workspace: &Workspace,
    slot: &mut QueueSlot,
) -> Result<Completion, OperationError> {
    let mut previous: Option<RunStatus> = None;
    let mut plan_reported = false;
    let mut policy_evaluated = false;
    let mut lock = LockWait::new(ctx.spec().lock_timeout);

    loop {
        let run = fetch_run(ctx, slot.run_id()).await?;
        slot.observe(run.status);
        if previous != Some(run.status) {
            tracing::debug!(run = %run.id, status = %run.status, "run status changed");
        }

        let deadline = if run.status == RunStatus::Pending {
            lock.check(ctx, workspace, &run).await?;
            lock.deadline()
        } else {
            lock.clear();
            None
        };

        for step in transition(previous, run.status) {
            match *step {
                Step::ReportPlan => {
                    if !plan_reported && run.plan.is_some() {
                        plan_reported = true;
                        ctx.say(&summary::plan_line(&run));
                    }
                }
                Step::EvaluatePolicy => {
                    if policy_evaluated {
                        continue;
                    }
                    let outcome = run.policy.as_ref().and_then(PolicyOutcome::from_check);
                    if let Some(outcome) = outcome {
                        policy_evaluated = true;
                        policy::evaluate(ctx, workspace, &run, outcome, slot).await?;
                    }
                }
                Step::Confirm => {
                    if !ctx.spec().applies() {
                        return Ok(completion(&run, false));
                    }
                    confirm::confirm(ctx, workspace, &run, slot).await?;
                }
                Step::ReportApply => match &run.apply {
                    Some(changes) => ctx.say(&summary::apply_line(changes)),
                    None => tracing::debug!(run = %run.id, "applied run carries no apply summary"),
                },
                Step::Finish(end) => return finish(ctx, &run, end),
            }
        }

        previous = Some(run.status);
        ctx.pause(deadline).await?;
    }
}

/// Reads the run, retrying transient failures at the poll interval.
///
/// # Errors
///
/// Returns `RemoteUnavailable` after too many consecutive failures, or the
/// mapped error for anything that is not transient.
pub(super) async fn fetch_run<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    run_id: &str,
) -> Result<Run, OperationError> {
    let mut failures = 0;
    loop {
        match ctx.interruptible(ctx.remote.read_run(run_id)).await? {
            Ok(run) => return Ok(run),
            Err(e) if e.is_transient() => {
                failures += 1;
                tracing::warn!(run = %run_id, attempt = failures, error = %e, "reading run failed");
                if failures >= ctx.settings.max_poll_failures {
                    return Err(OperationError::RemoteUnavailable {
                        attempts: failures,
                        reason: e.to_string(),
                    });
                }
                ctx.pause(None).await?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn finish<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    run: &Run,
    end: RunEnd,
) -> Result<Completion, OperationError> {
    match end {
        RunEnd::Planned => Ok(completion(run, false)),
        RunEnd::Applied => Ok(completion(run, true)),
        RunEnd::Discarded => {
            ctx.say(EXTERNAL_DISCARD);
            Err(OperationError::ApplyDiscarded { external: true })
        }
        RunEnd::Errored => {
            for line in summary::error_lines(&run.errors) {
                ctx.say(&line);
            }
            Err(OperationError::RemoteRun(run.error_count()))
        }
        RunEnd::Canceled => Err(OperationError::RemoteCanceled),
    }
}

fn completion(run: &Run, applied: bool) -> Completion {
    Completion {
        has_changes: run.has_changes,
        applied,
    }
}
