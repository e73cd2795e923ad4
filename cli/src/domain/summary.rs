//! Human-readable progress lines.

use runway_common::{ResourceChanges, ResourceErrors, Run};

use crate::domain::request::OperationKind;

pub const NO_CHANGES: &str = "No changes. Infrastructure is up-to-date.";
pub const EXTERNAL_APPROVAL: &str = "Apply approved using the UI or API.";
pub const EXTERNAL_DISCARD: &str = "Apply discarded using the UI or API.";
pub const EXTERNAL_OVERRIDE: &str = "Policy override applied using the UI or API.";
pub const LOCK_TIMEOUT: &str = "Lock timeout exceeded";

/// First line of every operation.
#[must_use]
pub fn header(kind: OperationKind) -> String {
    format!(
        "Running {} in the remote backend. Output will stream here. Pressing Ctrl-C\n\
will stop streaming the logs, but will not stop the {} running remotely.",
        kind.verb(),
        kind.verb()
    )
}

/// `Plan: X to add, ...` or the no-changes line.
#[must_use]
pub fn plan_line(run: &Run) -> String {
    match run.plan {
        Some(changes) if run.has_changes && !changes.is_empty() => format!(
            "Plan: {} to add, {} to change, {} to destroy.",
            changes.additions, changes.changes, changes.destructions
        ),
        _ => NO_CHANGES.to_string(),
    }
}

#[must_use]
pub fn apply_line(changes: &ResourceChanges) -> String {
    format!(
        "Apply complete! Resources: {} added, {} changed, {} destroyed.",
        changes.additions, changes.changes, changes.destructions
    )
}

/// One `address: N error(s)` line per failing resource, followed by its messages.
#[must_use]
pub fn error_lines(errors: &[ResourceErrors]) -> Vec<String> {
    let mut lines = Vec::new();
    for err in errors {
        let noun = if err.count == 1 { "error" } else { "errors" };
        lines.push(format!("{}: {} {noun}", err.address, err.count));
        lines.extend(err.messages.iter().map(|m| format!("  {m}")));
    }
    lines
}

/// Confirmation prompt text for the `approve` id.
#[must_use]
pub fn approve_query(destroy: bool) -> (&'static str, &'static str) {
    if destroy {
        (
            "Do you really want to destroy all resources in workspace?",
            "Runway will destroy all your managed infrastructure, as shown above.\n\
There is no undo. Only 'yes' will be accepted to confirm.",
        )
    } else {
        (
            "Do you want to perform these actions in workspace?",
            "Runway will perform the actions described above.\n\
Only 'yes' will be accepted to approve.",
        )
    }
}
