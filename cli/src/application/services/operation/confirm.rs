//! The approve/discard decision, and the race between a local answer and a
//! decision taken through another interface.

use std::pin::pin;

use runway_common::{Run, RunStatus, Workspace};

use super::lock::QueueSlot;
use super::poller::fetch_run;
use super::OperationContext;
use crate::application::ports::{
    ConfigLoader, PROMPT_APPROVE, Prompt, RemoteService, WAIT_FOR_EXTERNAL_UPDATE,
};
use crate::domain::summary::{self, EXTERNAL_APPROVAL, EXTERNAL_DISCARD};
use crate::domain::{OperationError, RemoteError};

const EXTERNAL_NOTICE: &str =
    "Waiting for the decision to be made using the UI or API. Press Ctrl-C to stop waiting.";

/// Who decided, and what.
#[derive(Debug)]
pub(super) enum Decision {
    Answer(String),
    /// The run left the waiting status without a local answer.
    Remote(Run),
}

enum Race {
    Stopped,
    Answered(anyhow::Result<String>),
    Moved(Result<Run, OperationError>),
}

/// Asks `prompt` while watching the run leave `waiting_in`.
///
/// The losing side is dropped: an answer never read stays unconsumed.
pub(super) async fn decide<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    prompt: &Prompt,
    run_id: &str,
    waiting_in: RunStatus,
) -> Result<Decision, OperationError> {
    let mut moved = pin!(wait_until_left(ctx, run_id, waiting_in));
    let Some(input) = ctx.input() else {
        ctx.say(EXTERNAL_NOTICE);
        return moved.await.map(Decision::Remote);
    };

    let race = tokio::select! {
        biased;
        () = ctx.stop.cancelled() => Race::Stopped,
        run = &mut moved => Race::Moved(run),
        answer = input.ask(prompt) => Race::Answered(answer),
    };
    match race {
        Race::Stopped => Err(OperationError::Canceled),
        Race::Moved(run) => run.map(Decision::Remote),
        Race::Answered(Ok(answer)) if answer.trim() == WAIT_FOR_EXTERNAL_UPDATE => {
            ctx.say(EXTERNAL_NOTICE);
            moved.await.map(Decision::Remote)
        }
        Race::Answered(Ok(answer)) => Ok(Decision::Answer(answer.trim().to_string())),
        Race::Answered(Err(e)) => Err(OperationError::Input(format!("{e:#}"))),
    }
}

/// Polls until the run's status is no longer `status`.
async fn wait_until_left<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    run_id: &str,
    status: RunStatus,
) -> Result<Run, OperationError> {
    loop {
        ctx.pause(None).await?;
        let run = fetch_run(ctx, run_id).await?;
        if run.status != status {
            return Ok(run);
        }
    }
}

/// Drives the run out of `confirming`.
pub(super) async fn confirm<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    workspace: &Workspace,
    run: &Run,
    slot: &mut QueueSlot,
) -> Result<(), OperationError> {
    if slot.is_decided() {
        return Ok(());
    }
    let spec = ctx.spec();
    if spec.auto_approve {
        return apply(ctx, run, slot).await;
    }
    if workspace.auto_apply {
        tracing::debug!(run = %run.id, "auto-apply workspace, not prompting");
        return Ok(());
    }

    let (query, description) = summary::approve_query(spec.destroy);
    let prompt = Prompt::new(PROMPT_APPROVE, query, description);
    match decide(ctx, &prompt, &run.id, RunStatus::Confirming).await? {
        Decision::Answer(answer) if answer == "yes" || answer == "approve" => {
            apply(ctx, run, slot).await
        }
        Decision::Answer(answer) => {
            tracing::info!(run = %run.id, answer = %answer, "apply not approved, discarding");
            ctx.interruptible(ctx.remote.discard_run(&run.id, Some("Discarded by runway")))
                .await??;
            slot.mark_released();
            Err(OperationError::ApplyDiscarded { external: false })
        }
        Decision::Remote(moved) => {
            slot.observe(moved.status);
            follow_external(ctx, &moved)
        }
    }
}

async fn apply<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    run: &Run,
    slot: &mut QueueSlot,
) -> Result<(), OperationError> {
    match ctx.interruptible(ctx.remote.apply_run(&run.id, None)).await? {
        Ok(()) => {
            slot.mark_decided();
            Ok(())
        }
        Err(RemoteError::Conflict(reason)) => {
            tracing::info!(run = %run.id, reason = %reason, "apply lost to an external decision");
            let current = fetch_run(ctx, &run.id).await?;
            slot.observe(current.status);
            if current.status == RunStatus::Confirming {
                return Err(OperationError::Remote(reason));
            }
            follow_external(ctx, &current)
        }
        Err(RemoteError::PermissionDenied(reason)) => {
            tracing::info!(run = %run.id, reason = %reason, "apply refused by the remote service");
            Err(OperationError::Permission("apply changes".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn follow_external<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    run: &Run,
) -> Result<(), OperationError> {
    match run.status {
        RunStatus::Discarded => {
            ctx.say(EXTERNAL_DISCARD);
            Err(OperationError::ApplyDiscarded { external: true })
        }
        RunStatus::Canceled => Err(OperationError::RemoteCanceled),
        RunStatus::Applying | RunStatus::Applied => {
            ctx.say(EXTERNAL_APPROVAL);
            Ok(())
        }
        _ => Ok(()),
    }
}
