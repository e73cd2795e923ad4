//! Options shared by `plan`, `apply` and `destroy`, and the loop that
//! drives one operation from the terminal.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Args};

use crate::app::AppContext;
use crate::application::ports::{InputSink, OutputSink};
use crate::application::services::config_service;
use crate::application::services::operation::OperationRequest;
use crate::domain::request::DEFAULT_PARALLELISM;
use crate::domain::{OperationKind, OperationSpec, RunwayConfig, Variable};
use crate::infra::signal;
use crate::output::{TerminalInput, TerminalOutput, json};

/// Arguments common to every remote operation.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Workspace to run in (defaults to `defaults.workspace`)
    #[arg(short, long, env = "RUNWAY_WORKSPACE")]
    pub workspace: Option<String>,

    /// Directory holding the configuration to upload
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Plan the destruction of every managed resource
    #[arg(long)]
    pub destroy: bool,

    /// Number of concurrent operations on the remote worker
    #[arg(long, default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: u32,

    /// Refresh state before planning
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub refresh: bool,

    /// Limit the run to a resource address (repeatable)
    #[arg(long = "target", value_name = "ADDRESS")]
    pub targets: Vec<String>,

    /// Set a variable as NAME=VALUE (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = Variable::parse)]
    pub variables: Vec<Variable>,

    /// Use a previously saved plan
    #[arg(long, value_name = "PATH")]
    pub plan_file: Option<PathBuf>,

    /// Seconds to wait for the workspace lock (0 waits forever)
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub lock_timeout: u64,

    /// Never prompt; decisions are left to the UI or API
    #[arg(long)]
    pub no_input: bool,
}

impl RunArgs {
    /// Builds the operation spec, resolving the workspace from config.
    ///
    /// # Errors
    ///
    /// Returns an error if no workspace is given or configured.
    pub fn spec(
        &self,
        kind: OperationKind,
        config: &RunwayConfig,
    ) -> Result<crate::domain::request::OperationSpecBuilder> {
        let workspace = config_service::resolve_workspace(config, self.workspace.as_deref())?;
        Ok(OperationSpec::builder(kind, workspace)
            .destroy(self.destroy)
            .parallelism(self.parallelism)
            .refresh(self.refresh)
            .targets(self.targets.clone())
            .variables(self.variables.clone())
            .plan_file(self.plan_file.clone())
            .lock_timeout(Duration::from_secs(self.lock_timeout))
            .config_dir(self.dir.clone()))
    }
}

/// Starts the operation and waits for it, stopping it on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the remote service is not configured.
pub async fn execute(
    app: &AppContext,
    config: &RunwayConfig,
    spec: OperationSpec,
    no_input: bool,
) -> Result<ExitCode> {
    let orchestrator = app.orchestrator(config)?;

    let output: Arc<dyn OutputSink> = Arc::new(TerminalOutput::new(&app.output));
    let mut request = OperationRequest::new(spec).with_output(output);
    if !no_input && !app.non_interactive {
        let input: Arc<dyn InputSink> = Arc::new(TerminalInput::spawn(&app.output));
        request = request.with_input(input);
    }

    signal::forward_ctrl_c(app.interrupt.clone());
    let handle = orchestrator.start(request);
    let outcome = tokio::select! {
        outcome = handle.done() => outcome,
        () = app.interrupt.cancelled() => {
            handle.stop();
            handle.done().await
        }
    };

    if app.is_json() {
        println!("{}", json::format_outcome(&outcome)?);
    }
    Ok(exit_code(outcome.exit_status()))
}

fn exit_code(status: i32) -> ExitCode {
    u8::try_from(status).map_or(ExitCode::FAILURE, ExitCode::from)
}
