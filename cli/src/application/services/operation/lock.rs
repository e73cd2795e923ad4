//! Workspace lock contention and the release of our run's queue slot.

use std::time::Duration;

use runway_common::{Run, RunStatus, Workspace};
use tokio::time::Instant;

use super::OperationContext;
use crate::application::ports::{ConfigLoader, RemoteService};
use crate::domain::OperationError;
use crate::domain::summary::LOCK_TIMEOUT;

const DISCARD_COMMENT: &str = "Discarded by runway";
const CANCEL_COMMENT: &str = "Canceled by runway";

/// Our run's place in the workspace queue.
///
/// Released on every exit path: a run that has not reached a terminal status
/// is discarded while it waits for a decision and canceled otherwise.
#[derive(Debug)]
pub(crate) struct QueueSlot {
    run_id: String,
    status: RunStatus,
    /// An apply or discard was issued; never issue a second one.
    decided: bool,
    /// Our own discard already gave the slot back.
    released: bool,
}

impl QueueSlot {
    pub fn new(run: &Run) -> Self {
        Self {
            run_id: run.id.clone(),
            status: run.status,
            decided: false,
            released: false,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn observe(&mut self, status: RunStatus) {
        self.status = status;
    }

    pub fn mark_decided(&mut self) {
        self.decided = true;
    }

    pub fn is_decided(&self) -> bool {
        self.decided
    }

    pub fn mark_released(&mut self) {
        self.decided = true;
        self.released = true;
    }

    pub async fn release<R: RemoteService>(&self, remote: &R) {
        if self.released || self.status.is_terminal() {
            return;
        }
        let result = if self.status.awaits_decision() && !self.decided {
            tracing::debug!(run = %self.run_id, status = %self.status, "discarding run");
            remote.discard_run(&self.run_id, Some(DISCARD_COMMENT)).await
        } else {
            tracing::debug!(run = %self.run_id, status = %self.status, "canceling run");
            remote.cancel_run(&self.run_id, Some(CANCEL_COMMENT)).await
        };
        if let Err(e) = result {
            tracing::warn!(run = %self.run_id, error = %e, "could not release run");
        }
    }
}

/// Tracks how long our pending run has waited behind another run.
pub(crate) struct LockWait {
    timeout: Duration,
    deadline: Option<Instant>,
    announced: bool,
}

impl LockWait {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
            announced: false,
        }
    }

    /// Deadline the poller must wake up for while contention lasts.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Forgets a contention that has ended.
    pub fn clear(&mut self) {
        if self.announced {
            tracing::debug!("workspace lock acquired");
        }
        self.deadline = None;
        self.announced = false;
    }

    /// Checks contention for a pending run.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` once a non-zero timeout has elapsed.
    pub async fn check<R: RemoteService, L: ConfigLoader>(
        &mut self,
        ctx: &OperationContext<R, L>,
        workspace: &Workspace,
        run: &Run,
    ) -> Result<(), OperationError> {
        let current = match ctx
            .interruptible(ctx.remote.read_workspace(&workspace.name))
            .await?
        {
            Ok(ws) => ws.current_run,
            Err(e) => {
                tracing::debug!(error = %e, "could not read workspace lock holder");
                return self.expire(ctx);
            }
        };
        let Some(holder) = current.filter(|holder| *holder != run.id) else {
            self.clear();
            return Ok(());
        };
        if !self.announced {
            self.announced = true;
            ctx.say(&format!(
                "Waiting for the workspace lock held by run {holder}..."
            ));
            if !self.timeout.is_zero() {
                self.deadline = Some(Instant::now() + self.timeout);
            }
        }
        self.expire(ctx)
    }

    fn expire<R: RemoteService, L: ConfigLoader>(
        &self,
        ctx: &OperationContext<R, L>,
    ) -> Result<(), OperationError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                tracing::info!(timeout = ?self.timeout, "workspace lock timeout exceeded");
                ctx.say(LOCK_TIMEOUT);
                ctx.interrupt.cancel();
                Err(OperationError::LockTimeout(self.timeout))
            }
            _ => Ok(()),
        }
    }
}
