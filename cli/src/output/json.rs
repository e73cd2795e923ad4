//! JSON output helpers for `--json`.

use anyhow::{Context, Result};

use crate::domain::OperationOutcome;

/// Format a JSON error object for failures outside an operation.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format the outcome of an operation.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_outcome(outcome: &OperationOutcome) -> Result<String> {
    let error = outcome.error.as_ref().map(|e| {
        serde_json::json!({
            "category": e.category(),
            "message": e.to_string(),
            "detail": e.detail(),
        })
    });
    let obj = serde_json::json!({
        "result": outcome.result.as_str(),
        "exit_status": outcome.exit_status(),
        "plan_empty": outcome.plan_empty,
        "run_id": outcome.run_id,
        "error": error,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
