//! Uploads the configuration and queues the run.

use runway_common::{Run, RunCreate, Workspace};

use super::OperationContext;
use crate::application::ports::{ConfigLoader, RemoteService};
use crate::domain::{OperationError, summary};

const RUN_MESSAGE: &str = "Queued manually using runway";

pub(super) async fn submit<R: RemoteService, L: ConfigLoader>(
    ctx: &OperationContext<R, L>,
    workspace: &Workspace,
) -> Result<Run, OperationError> {
    let spec = ctx.spec();
    let snapshot = ctx
        .loader
        .load(&spec.config_dir)
        .map_err(|e| OperationError::Submission(format!("{e:#}")))?;
    if snapshot.is_empty() && !spec.destroy {
        return Err(OperationError::Submission(format!(
            "No configuration files found in {}.",
            spec.config_dir.display()
        )));
    }

    ctx.say(&summary::header(spec.kind));

    let version = ctx
        .interruptible(ctx.remote.create_configuration_version(&workspace.id))
        .await??;
    tracing::debug!(version = %version.id, files = snapshot.files.len(), "uploading configuration");
    ctx.interruptible(ctx.remote.upload_configuration(&version, &snapshot))
        .await??;

    // Never dropped on stop: a created run must land in the queue slot.
    let run = ctx
        .remote
        .create_run(&RunCreate {
            workspace_id: workspace.id.clone(),
            configuration_version_id: version.id.clone(),
            is_destroy: spec.destroy,
            speculative: !spec.applies(),
            message: Some(RUN_MESSAGE.to_string()),
        })
        .await?;
    tracing::info!(run = %run.id, workspace = %workspace.name, "run queued");

    ctx.say(&format!(
        "\nTo view this run in a browser, visit:\n{}\n",
        ctx.remote.run_url(&workspace.name, &run.id)
    ));
    Ok(run)
}
