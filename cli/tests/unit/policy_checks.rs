//! Policy verdicts: pass, hard fail, and the soft-fail override prompt.

#![allow(clippy::expect_used)]

use runway_cli::domain::summary::EXTERNAL_OVERRIDE;
use runway_cli::domain::{OperationError, OperationKind, OperationResult, OperationSpec};
use runway_common::PolicyStatus;

use crate::mocks::{
    External, FakeLoader, FakeRemote, Harness, Scenario, apply_spec, plan_spec, within,
    workspace,
};

fn soft_failed() -> Scenario {
    Scenario::policy(PolicyStatus::SoftFailed)
}

#[tokio::test]
async fn passed_policy_continues_to_confirmation() {
    let h = Harness::scenario(Scenario::policy(PolicyStatus::Passed))
        .answers(&[("approve", "yes")]);

    let outcome = within(h.start(apply_spec()).done()).await;

    assert_eq!(outcome.result, OperationResult::AppliedWithChanges);
    let text = h.output.text();
    assert!(text.contains("Policy Result: true"), "got: {text}");
    assert_eq!(h.asked(), vec!["approve".to_string()]);
}

#[tokio::test]
async fn hard_failed_policy_fails_and_discards() {
    let h = Harness::scenario(Scenario::policy(PolicyStatus::HardFailed))
        .answers(&[("approve", "yes"), ("override", "override")]);

    let outcome = within(h.start(apply_spec()).done()).await;

    assert_eq!(outcome.result, OperationResult::Failed);
    assert_eq!(outcome.error, Some(OperationError::PolicyHardFail));
    assert!(h.output.text().contains("Policy Result: false"));
    assert!(h.asked().is_empty());
    assert_eq!(h.remote.count("override"), 0);
    assert_eq!(h.remote.count("discard"), 1);
}

#[tokio::test]
async fn hard_failed_policy_ignores_auto_approve_and_override_answer() {
    let h = Harness::scenario(Scenario::policy(PolicyStatus::HardFailed))
        .answers(&[("override", "override")]);
    let spec = OperationSpec::builder(OperationKind::Apply, "prod")
        .auto_approve(true)
        .build();

    let outcome = within(h.start(spec).done()).await;

    assert_eq!(outcome.error, Some(OperationError::PolicyHardFail));
    assert!(outcome.plan_empty);
    assert_eq!(h.unused(), 1);
    assert!(h.asked().is_empty());
    let text = h.output.text();
    assert!(!text.contains("Apply complete!"), "got: {text}");
    assert!(!text.contains("added"), "got: {text}");
    assert_eq!(h.remote.count("apply"), 0);
    assert_eq!(h.remote.count("override"), 0);
}

#[tokio::test]
async fn soft_fail_override_answer_overrides_then_confirms() {
    let h = Harness::scenario(soft_failed())
        .answers(&[("override", "override"), ("approve", "yes")]);

    let outcome = within(h.start(apply_spec()).done()).await;

    assert_eq!(outcome.result, OperationResult::AppliedWithChanges);
    assert_eq!(h.remote.count("override"), 1);
    assert_eq!(h.remote.count("apply"), 1);
    assert_eq!(
        h.asked(),
        vec!["override".to_string(), "approve".to_string()]
    );
    assert_eq!(h.unused(), 0);
}

#[tokio::test]
async fn soft_fail_other_answer_fails_and_discards() {
    let h = Harness::scenario(soft_failed()).answers(&[("override", "no")]);

    let outcome = within(h.start(apply_spec()).done()).await;

    assert_eq!(outcome.error, Some(OperationError::PolicySoftFail));
    assert_eq!(h.remote.count("override"), 0);
    assert_eq!(h.remote.count("discard"), 1);
    assert!(h.output.errors().contains("Policy check soft failed."));
}

#[tokio::test]
async fn soft_fail_during_plan_fails_without_prompt() {
    let h = Harness::scenario(soft_failed()).answers(&[("override", "override")]);

    let outcome = within(h.start(plan_spec()).done()).await;

    assert_eq!(outcome.error, Some(OperationError::PolicySoftFail));
    assert!(h.asked().is_empty());
    assert_eq!(h.unused(), 1);
}

#[tokio::test]
async fn soft_fail_with_auto_approve_fails_without_prompt() {
    let h = Harness::scenario(soft_failed()).answers(&[("override", "override")]);
    let spec = OperationSpec::builder(OperationKind::Apply, "prod")
        .auto_approve(true)
        .build();

    let outcome = within(h.start(spec).done()).await;

    assert_eq!(outcome.error, Some(OperationError::PolicySoftFail));
    assert!(h.asked().is_empty());
    assert_eq!(h.remote.count("override"), 0);
}

#[tokio::test]
async fn soft_fail_that_cannot_be_overridden_fails_without_prompt() {
    let scenario = Scenario {
        can_override: false,
        ..soft_failed()
    };
    let h = Harness::scenario(scenario).answers(&[("override", "override")]);

    let outcome = within(h.start(apply_spec()).done()).await;

    assert_eq!(outcome.error, Some(OperationError::PolicySoftFail));
    assert!(h.asked().is_empty());
}

#[tokio::test]
async fn soft_fail_without_override_permission_fails_without_prompt() {
    let mut ws = workspace();
    ws.permissions.can_override_policy = false;
    let h = Harness::new(FakeRemote::new(ws, soft_failed()), FakeLoader::with_config())
        .answers(&[("override", "override")]);

    let outcome = within(h.start(apply_spec()).done()).await;

    assert_eq!(outcome.error, Some(OperationError::PolicySoftFail));
    assert!(h.asked().is_empty());
}

#[tokio::test]
async fn soft_fail_overridden_externally_while_prompt_waits() {
    let scenario = Scenario {
        external: Some((External::Override, 1)),
        ..soft_failed()
    };
    let h = Harness::scenario(scenario).answers(&[
        ("override", "wait-for-external-update"),
        ("approve", "yes"),
    ]);

    let outcome = within(h.start(apply_spec()).done()).await;

    assert_eq!(outcome.result, OperationResult::AppliedWithChanges);
    assert!(h.output.text().contains(EXTERNAL_OVERRIDE));
    assert_eq!(h.remote.count("override"), 0);
    // The waiting answer was never handed out.
    assert_eq!(h.unused(), 1);
}
