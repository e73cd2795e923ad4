//! Publishes the single outcome of an operation.

use tokio::sync::watch;

use super::{Completion, OperationContext};
use crate::application::ports::{ConfigLoader, RemoteService};
use crate::domain::{OperationError, OperationOutcome};

/// Writes the error (if any), flushes the sinks, then fires completion.
pub(super) fn publish<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    run_id: Option<String>,
    result: Result<Completion, OperationError>,
    done: &watch::Sender<Option<OperationOutcome>>,
) {
    let outcome = match result {
        Ok(completion) => {
            OperationOutcome::success(run_id, completion.has_changes, completion.applied)
        }
        Err(err) => {
            ctx.complain(&format!("Error: {err}"));
            if let Some(detail) = err.detail() {
                ctx.complain(detail);
            }
            tracing::info!(category = err.category(), error = %err, "operation failed");
            OperationOutcome::failure(run_id, err)
        }
    };
    ctx.flush();
    tracing::debug!(
        result = outcome.result.as_str(),
        plan_empty = outcome.plan_empty,
        "operation finished"
    );
    done.send_replace(Some(outcome));
}
