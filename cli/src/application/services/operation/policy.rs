//! Reaction to a policy verdict.

use runway_common::{Run, RunStatus, Workspace};

use super::OperationContext;
use super::confirm::{Decision, decide};
use super::lock::QueueSlot;
use crate::application::ports::{ConfigLoader, PROMPT_OVERRIDE, Prompt, RemoteService};
use crate::domain::summary::{EXTERNAL_DISCARD, EXTERNAL_OVERRIDE};
use crate::domain::{OperationError, PolicyOutcome};

/// Prints the verdict, then continues, fails, or asks for an override.
pub(super) async fn evaluate<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    workspace: &Workspace,
    run: &Run,
    outcome: PolicyOutcome,
    slot: &mut QueueSlot,
) -> Result<(), OperationError> {
    for line in outcome.lines() {
        ctx.say(&line);
    }
    let can_override = match outcome {
        PolicyOutcome::Passed { .. } => return Ok(()),
        PolicyOutcome::HardFailed { .. } => return Err(OperationError::PolicyHardFail),
        PolicyOutcome::SoftFailed { can_override, .. } => can_override,
    };

    let spec = ctx.spec();
    let overridable = can_override && workspace.permissions.can_override_policy;
    if !spec.applies() || spec.auto_approve || ctx.input().is_none() || !overridable {
        tracing::debug!(
            run = %run.id,
            auto_approve = spec.auto_approve,
            overridable,
            "soft-failed policy not offered for override"
        );
        return Err(OperationError::PolicySoftFail);
    }

    let prompt = Prompt::new(
        PROMPT_OVERRIDE,
        "Do you want to override the soft failed policy check?",
        "Only 'override' will be accepted to override.",
    );
    match decide(ctx, &prompt, &run.id, RunStatus::PolicySoftFailed).await? {
        Decision::Answer(answer) if answer == "override" => {
            ctx.interruptible(ctx.remote.override_policy(&run.id))
                .await??;
            tracing::info!(run = %run.id, "policy check overridden");
            Ok(())
        }
        Decision::Answer(_) => Err(OperationError::PolicySoftFail),
        Decision::Remote(moved) => {
            slot.observe(moved.status);
            match moved.status {
                RunStatus::Discarded => {
                    ctx.say(EXTERNAL_DISCARD);
                    Err(OperationError::ApplyDiscarded { external: true })
                }
                RunStatus::Canceled => Err(OperationError::RemoteCanceled),
                _ => {
                    ctx.say(EXTERNAL_OVERRIDE);
                    Ok(())
                }
            }
        }
    }
}
