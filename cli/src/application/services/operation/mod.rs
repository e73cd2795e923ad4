//! Application service: remote operation orchestration.
//!
//! One spawned task per operation: validate, submit, then follow the run
//! until it ends. Every suspension point races the stop token, and the
//! run's queue slot is released before the outcome is published.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

mod confirm;
mod lock;
mod policy;
mod poller;
mod report;
mod submit;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ConfigLoader, InputSink, OutputSink, RemoteService};
use crate::domain::config::PollingConfig;
use crate::domain::{
    OperationError, OperationOutcome, OperationResult, OperationSpec, validate,
};

use lock::QueueSlot;

// ── Request ───────────────────────────────────────────────────────────────────

/// An [`OperationSpec`] plus the UI handles the operation talks through.
pub struct OperationRequest {
    pub spec: OperationSpec,
    pub output: Option<Arc<dyn OutputSink>>,
    /// With no input attached, decisions are left to other interfaces.
    pub input: Option<Arc<dyn InputSink>>,
}

impl OperationRequest {
    #[must_use]
    pub fn new(spec: OperationSpec) -> Self {
        Self {
            spec,
            output: None,
            input: None,
        }
    }

    #[must_use]
    pub fn with_output(mut self, output: Arc<dyn OutputSink>) -> Self {
        self.output = Some(output);
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: Arc<dyn InputSink>) -> Self {
        self.input = Some(input);
        self
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub poll_interval: Duration,
    /// Consecutive failed status reads tolerated before giving up.
    pub max_poll_failures: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        PollingConfig::default().into()
    }
}

impl From<PollingConfig> for OrchestratorSettings {
    fn from(polling: PollingConfig) -> Self {
        Self {
            poll_interval: polling.interval(),
            max_poll_failures: polling.max_failures.max(1),
        }
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Starts operations against a remote service.
pub struct Orchestrator<R, L> {
    remote: Arc<R>,
    loader: Arc<L>,
    settings: OrchestratorSettings,
    interrupt: CancellationToken,
}

impl<R, L> Orchestrator<R, L>
where
    R: RemoteService + 'static,
    L: ConfigLoader + 'static,
{
    #[must_use]
    pub fn new(remote: Arc<R>, loader: Arc<L>, settings: OrchestratorSettings) -> Self {
        Self {
            remote,
            loader,
            settings,
            interrupt: CancellationToken::new(),
        }
    }

    /// Shares the shell interrupt token. A lock timeout cancels it.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: CancellationToken) -> Self {
        self.interrupt = interrupt;
        self
    }

    #[must_use]
    pub fn interrupt(&self) -> &CancellationToken {
        &self.interrupt
    }

    /// Spawns the operation and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, request: OperationRequest) -> OperationHandle {
        let stop = CancellationToken::new();
        let (done_tx, done_rx) = watch::channel(None);
        let ctx = OperationContext {
            remote: Arc::clone(&self.remote),
            loader: Arc::clone(&self.loader),
            settings: self.settings,
            request: Arc::new(request),
            stop: stop.clone(),
            interrupt: self.interrupt.clone(),
        };
        tracing::debug!(
            kind = %ctx.spec().kind,
            workspace = %ctx.spec().workspace,
            destroy = ctx.spec().destroy,
            "starting operation"
        );
        tokio::spawn(run_operation(ctx, done_tx));
        OperationHandle {
            stop,
            done: done_rx,
        }
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Caller's side of a running operation.
#[derive(Clone)]
pub struct OperationHandle {
    stop: CancellationToken,
    done: watch::Receiver<Option<OperationOutcome>>,
}

impl OperationHandle {
    /// Requests cancellation. Never blocks; safe to call repeatedly or late.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Waits for the operation to complete.
    pub async fn done(&self) -> OperationOutcome {
        let mut rx = self.done.clone();
        let published = rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|outcome| outcome.clone());
        published.unwrap_or_else(|| {
            OperationOutcome::failure(
                None,
                OperationError::Internal("operation task ended without an outcome".to_string()),
            )
        })
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.borrow().is_some()
    }

    /// The outcome, once the operation has completed.
    #[must_use]
    pub fn outcome(&self) -> Option<OperationOutcome> {
        self.done.borrow().clone()
    }

    #[must_use]
    pub fn result(&self) -> Option<OperationResult> {
        self.done.borrow().as_ref().map(|o| o.result)
    }

    #[must_use]
    pub fn plan_empty(&self) -> Option<bool> {
        self.done.borrow().as_ref().map(|o| o.plan_empty)
    }
}

// ── Task body ─────────────────────────────────────────────────────────────────

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Completion {
    pub has_changes: bool,
    pub applied: bool,
}

pub(crate) struct OperationContext<R, L> {
    pub remote: Arc<R>,
    pub loader: Arc<L>,
    pub settings: OrchestratorSettings,
    pub request: Arc<OperationRequest>,
    pub stop: CancellationToken,
    pub interrupt: CancellationToken,
}

impl<R: RemoteService, L: ConfigLoader> OperationContext<R, L> {
    pub fn spec(&self) -> &OperationSpec {
        &self.request.spec
    }

    pub fn input(&self) -> Option<&Arc<dyn InputSink>> {
        self.request.input.as_ref()
    }

    pub fn say(&self, line: &str) {
        if let Some(out) = &self.request.output {
            out.output(line);
        }
    }

    pub fn complain(&self, line: &str) {
        if let Some(out) = &self.request.output {
            out.error(line);
        }
    }

    pub fn flush(&self) {
        if let Some(out) = &self.request.output {
            out.flush();
        }
    }

    /// Runs `fut` unless stop is requested first.
    pub async fn interruptible<F: Future>(&self, fut: F) -> Result<F::Output, OperationError> {
        tokio::select! {
            biased;
            () = self.stop.cancelled() => Err(OperationError::Canceled),
            out = fut => Ok(out),
        }
    }

    /// Sleeps one poll interval, or until `deadline` if that comes first.
    pub async fn pause(&self, deadline: Option<tokio::time::Instant>) -> Result<(), OperationError> {
        let tick = tokio::time::Instant::now() + self.settings.poll_interval;
        let until = deadline.map_or(tick, |d| d.min(tick));
        self.interruptible(tokio::time::sleep_until(until)).await
    }
}

async fn run_operation<R, L>(
    ctx: OperationContext<R, L>,
    done: watch::Sender<Option<OperationOutcome>>,
) where
    R: RemoteService + 'static,
    L: ConfigLoader + 'static,
{
    let mut slot: Option<QueueSlot> = None;
    let result = match AssertUnwindSafe(drive(&ctx, &mut slot)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            tracing::error!(panic = %msg, "operation task panicked");
            Err(OperationError::Internal(msg))
        }
    };
    if let Some(slot) = &slot {
        slot.release(ctx.remote.as_ref()).await;
    }
    let run_id = slot.map(|s| s.run_id().to_string());
    report::publish(&ctx, run_id, result, &done);
}

async fn drive<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    slot: &mut Option<QueueSlot>,
) -> Result<Completion, OperationError> {
    let spec = ctx.spec();
    let workspace = ctx
        .interruptible(ctx.remote.read_workspace(&spec.workspace))
        .await??;
    validate(spec, &workspace)?;

    let run = submit::submit(ctx, &workspace).await?;
    let slot = slot.insert(QueueSlot::new(&run));
    if ctx.stop.is_cancelled() {
        tracing::debug!(run = %run.id, "stop requested while the run was being created");
        return Err(OperationError::Canceled);
    }
    poller::follow(ctx, &workspace, slot).await
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "operation task panicked".to_string()
    }
}
