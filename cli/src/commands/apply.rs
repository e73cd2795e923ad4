//! `runway apply` and `runway destroy`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::commands::operation::{RunArgs, execute};
use crate::domain::OperationKind;

/// Arguments for `apply` and `destroy`.
#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Skip the interactive approval of the plan
    #[arg(long)]
    pub auto_approve: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Run an apply, or a destroy when `destroy` is set.
///
/// # Errors
///
/// Returns an error if configuration is missing or unreadable.
pub async fn run(app: &AppContext, args: ApplyArgs, destroy: bool) -> Result<ExitCode> {
    let config = app.config()?;
    let mut spec = args
        .run
        .spec(OperationKind::Apply, &config)?
        .auto_approve(args.auto_approve);
    if destroy {
        spec = spec.destroy(true);
    }
    execute(app, &config, spec.build(), args.run.no_input).await
}
