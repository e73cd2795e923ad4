//! `runway plan`: a speculative run that never applies.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::operation::{RunArgs, execute};
use crate::domain::OperationKind;

/// Run a plan.
///
/// # Errors
///
/// Returns an error if configuration is missing or unreadable.
pub async fn run(app: &AppContext, args: RunArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let spec = args.spec(OperationKind::Plan, &config)?.build();
    execute(app, &config, spec, args.no_input).await
}
