//! Shared fakes for unit tests.
//!
//! `FakeRemote` simulates the remote run service: every `read_run` moves the
//! run one status forward along the path its `Scenario` describes, and parks
//! it wherever a decision is needed until the matching action arrives.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use futures_util::FutureExt as _;
use futures_util::future::BoxFuture;
use runway_common::{
    ConfigurationVersion, PolicyCheck, PolicyStatus, ResourceChanges, ResourceErrors, Run,
    RunCreate, RunStatus, Workspace, WorkspacePermissions,
};
use runway_cli::application::ports::{
    ConfigLoader, ConfigStore, InputSink, OutputSink, Prompt, RemoteService,
    WAIT_FOR_EXTERNAL_UPDATE,
};
use runway_cli::application::services::operation::{
    OperationHandle, OperationRequest, Orchestrator, OrchestratorSettings,
};
use runway_cli::domain::{
    ConfigSnapshot, OperationKind, OperationSpec, RemoteError, RunwayConfig,
};

pub const RUN_ID: &str = "run-1";
pub const OTHER_RUN_ID: &str = "run-other";
pub const POLL: Duration = Duration::from_millis(5);

// ── Scenario ──────────────────────────────────────────────────────────────────

/// A decision taken through another interface while the run waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum External {
    Approve,
    Discard,
    Override,
}

/// How the fake remote service behaves.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub changes: ResourceChanges,
    pub policy: Option<PolicyStatus>,
    pub can_override: bool,
    /// Errors reported when the apply fails.
    pub apply_errors: Vec<ResourceErrors>,
    /// Decision taken externally after the run has waited this many reads.
    pub external: Option<(External, u32)>,
    /// `apply_run` loses to an external discard.
    pub apply_conflict: bool,
    pub apply_forbidden: bool,
    /// `read_workspace` is refused, as with a revoked token.
    pub token_rejected: bool,
    /// The applied run comes back without an apply summary.
    pub omit_apply_summary: bool,
    /// The next N `read_run` calls fail with `Unavailable`.
    pub failing_reads: u32,
    pub panic_on_read: bool,
    /// `create_run` stores the run, then takes this long to respond.
    pub create_run_delay: Option<Duration>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            changes: ResourceChanges::new(1, 0, 0),
            policy: None,
            can_override: true,
            apply_errors: Vec::new(),
            external: None,
            apply_conflict: false,
            apply_forbidden: false,
            token_rejected: false,
            omit_apply_summary: false,
            failing_reads: 0,
            panic_on_read: false,
            create_run_delay: None,
        }
    }
}

impl Scenario {
    pub fn no_changes() -> Self {
        Self {
            changes: ResourceChanges::default(),
            ..Self::default()
        }
    }

    pub fn destroy() -> Self {
        Self {
            changes: ResourceChanges::new(0, 0, 1),
            ..Self::default()
        }
    }

    pub fn policy(status: PolicyStatus) -> Self {
        Self {
            policy: Some(status),
            ..Self::default()
        }
    }
}

pub fn workspace() -> Workspace {
    Workspace {
        id: "ws-1".to_string(),
        name: "prod".to_string(),
        vcs_connected: false,
        operations: true,
        auto_apply: false,
        current_run: None,
        permissions: WorkspacePermissions::default(),
    }
}

// ── FakeRemote ────────────────────────────────────────────────────────────────

struct FakeState {
    workspace: Workspace,
    scenario: Scenario,
    run: Option<Run>,
    speculative: bool,
    waited: u32,
    lock_holder: Option<String>,
    /// `read_run` calls left before the lock holder finishes.
    lock_reads: Option<u32>,
}

pub struct FakeRemote {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<String>>,
    created: Mutex<Vec<RunCreate>>,
}

impl FakeRemote {
    pub fn new(workspace: Workspace, scenario: Scenario) -> Self {
        Self {
            state: Mutex::new(FakeState {
                workspace,
                scenario,
                run: None,
                speculative: false,
                waited: 0,
                lock_holder: None,
                lock_reads: None,
            }),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_scenario(scenario: Scenario) -> Self {
        Self::new(workspace(), scenario)
    }

    /// Another run holds the workspace lock for the whole test.
    pub fn locked_by_other_run(self) -> Self {
        self.state.lock().expect("state").lock_holder = Some(OTHER_RUN_ID.to_string());
        self
    }

    /// Another run holds the workspace lock for the next `reads` run reads.
    pub fn locked_by_other_run_for(self, reads: u32) -> Self {
        {
            let mut state = self.state.lock().expect("state");
            state.lock_holder = Some(OTHER_RUN_ID.to_string());
            state.lock_reads = Some(reads);
        }
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn created_runs(&self) -> Vec<RunCreate> {
        self.created.lock().expect("created").clone()
    }

    pub fn status(&self) -> Option<RunStatus> {
        self.state
            .lock()
            .expect("state")
            .run
            .as_ref()
            .map(|r| r.status)
    }

    fn record(&self, call: &str) {
        self.calls.lock().expect("calls").push(call.to_string());
    }

    fn with_run<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().expect("state");
        f(&mut state)
    }
}

fn after_policy(state: &FakeState) -> RunStatus {
    if state.workspace.auto_apply {
        RunStatus::Applying
    } else {
        RunStatus::Confirming
    }
}

/// Moves the run one status forward.
fn advance(state: &mut FakeState) {
    let Some(run) = state.run.as_ref() else {
        return;
    };
    let current = run.status;
    let scenario = state.scenario.clone();
    let next = match current {
        RunStatus::Pending if state.lock_holder.is_some() => RunStatus::Pending,
        RunStatus::Pending => RunStatus::Planning,
        RunStatus::Planning => {
            if scenario.changes.is_empty() {
                RunStatus::PlannedAndFinished
            } else if scenario.policy.is_some() {
                RunStatus::PolicyChecking
            } else if state.speculative {
                RunStatus::PlannedAndFinished
            } else {
                after_policy(state)
            }
        }
        RunStatus::PolicyChecking => match scenario.policy {
            Some(PolicyStatus::SoftFailed) => RunStatus::PolicySoftFailed,
            Some(PolicyStatus::HardFailed) => RunStatus::PolicyHardFailed,
            _ if state.speculative => RunStatus::PlannedAndFinished,
            _ => after_policy(state),
        },
        RunStatus::Confirming | RunStatus::PolicySoftFailed => {
            state.waited += 1;
            match scenario.external {
                Some((External::Approve, after)) if state.waited > after => {
                    RunStatus::Applying
                }
                Some((External::Discard, after)) if state.waited > after => {
                    RunStatus::Discarded
                }
                Some((External::Override, after))
                    if state.waited > after && current == RunStatus::PolicySoftFailed =>
                {
                    after_policy(state)
                }
                _ => current,
            }
        }
        RunStatus::Applying => {
            if scenario.apply_errors.is_empty() {
                RunStatus::Applied
            } else {
                RunStatus::Errored
            }
        }
        other => other,
    };
    set_status(state, next);
}

fn set_status(state: &mut FakeState, next: RunStatus) {
    let scenario = state.scenario.clone();
    let Some(run) = state.run.as_mut() else {
        return;
    };
    if run.status != next {
        state.waited = 0;
    }
    run.status = next;
    match next {
        RunStatus::Planned
        | RunStatus::PlannedAndFinished
        | RunStatus::PolicyChecking
        | RunStatus::Confirming
        | RunStatus::Applying => {
            run.plan = Some(scenario.changes);
            run.has_changes = !scenario.changes.is_empty();
        }
        RunStatus::PolicySoftFailed | RunStatus::PolicyHardFailed => {
            let status = scenario.policy.unwrap_or(PolicyStatus::Passed);
            run.policy = Some(policy_check(status, scenario.can_override));
        }
        RunStatus::Applied if !scenario.omit_apply_summary => run.apply = Some(scenario.changes),
        RunStatus::Errored => run.errors.clone_from(&scenario.apply_errors),
        _ => {}
    }
    if matches!(next, RunStatus::Confirming | RunStatus::Applying | RunStatus::PlannedAndFinished)
        && run.policy.is_none()
        && let Some(status) = scenario.policy
    {
        run.policy = Some(policy_check(status, scenario.can_override));
    }
}

fn policy_check(status: PolicyStatus, can_override: bool) -> PolicyCheck {
    let result = matches!(status, PolicyStatus::Passed);
    PolicyCheck {
        status,
        result,
        description: "Sentinel Result: policy evaluation finished\n\n1 policies evaluated."
            .to_string(),
        can_override,
    }
}

impl RemoteService for FakeRemote {
    async fn read_workspace(&self, name: &str) -> Result<Workspace, RemoteError> {
        self.record("read_workspace");
        self.with_run(|state| {
            if state.scenario.token_rejected {
                return Err(RemoteError::PermissionDenied("401 invalid token".to_string()));
            }
            if state.workspace.name != name {
                return Err(RemoteError::NotFound(format!("workspace {name}")));
            }
            let mut ws = state.workspace.clone();
            ws.current_run = state
                .lock_holder
                .clone()
                .or_else(|| state.run.as_ref().map(|r| r.id.clone()));
            Ok(ws)
        })
    }

    async fn create_configuration_version(
        &self,
        _workspace_id: &str,
    ) -> Result<ConfigurationVersion, RemoteError> {
        self.record("create_configuration_version");
        Ok(ConfigurationVersion {
            id: "cv-1".to_string(),
            upload_url: "https://upload.example/cv-1".to_string(),
        })
    }

    async fn upload_configuration(
        &self,
        _version: &ConfigurationVersion,
        _snapshot: &ConfigSnapshot,
    ) -> Result<(), RemoteError> {
        self.record("upload_configuration");
        Ok(())
    }

    async fn create_run(&self, create: &RunCreate) -> Result<Run, RemoteError> {
        self.record("create_run");
        self.created.lock().expect("created").push(create.clone());
        let (run, delay) = self.with_run(|state| {
            let run = Run::pending(RUN_ID, create.is_destroy);
            state.speculative = create.speculative;
            state.run = Some(run.clone());
            (run, state.scenario.create_run_delay)
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(run)
    }

    async fn read_run(&self, run_id: &str) -> Result<Run, RemoteError> {
        self.record("read_run");
        let panic_now = self.with_run(|state| state.scenario.panic_on_read);
        assert!(!panic_now, "remote adapter exploded");
        self.with_run(|state| {
            if state.scenario.failing_reads > 0 {
                state.scenario.failing_reads -= 1;
                return Err(RemoteError::Unavailable("connection reset".to_string()));
            }
            match state.lock_reads {
                Some(0) => {
                    state.lock_holder = None;
                    state.lock_reads = None;
                }
                Some(left) => state.lock_reads = Some(left - 1),
                None => {}
            }
            advance(state);
            state
                .run
                .clone()
                .filter(|r| r.id == run_id)
                .ok_or_else(|| RemoteError::NotFound(run_id.to_string()))
        })
    }

    async fn apply_run(&self, _run_id: &str, _comment: Option<&str>) -> Result<(), RemoteError> {
        self.record("apply");
        self.with_run(|state| {
            if state.scenario.apply_forbidden {
                return Err(RemoteError::PermissionDenied("403 Forbidden".to_string()));
            }
            if state.scenario.apply_conflict {
                set_status(state, RunStatus::Discarded);
                return Err(RemoteError::Conflict("run is not confirmable".to_string()));
            }
            match state.run.as_ref().map(|r| r.status) {
                Some(RunStatus::Confirming) => {
                    set_status(state, RunStatus::Applying);
                    Ok(())
                }
                _ => Err(RemoteError::Conflict("run is not confirmable".to_string())),
            }
        })
    }

    async fn discard_run(&self, _run_id: &str, _comment: Option<&str>) -> Result<(), RemoteError> {
        self.record("discard");
        self.with_run(|state| {
            set_status(state, RunStatus::Discarded);
            Ok(())
        })
    }

    async fn cancel_run(&self, _run_id: &str, _comment: Option<&str>) -> Result<(), RemoteError> {
        self.record("cancel");
        self.with_run(|state| {
            set_status(state, RunStatus::Canceled);
            Ok(())
        })
    }

    async fn override_policy(&self, _run_id: &str) -> Result<(), RemoteError> {
        self.record("override");
        self.with_run(|state| {
            if let Some(run) = state.run.as_mut() {
                run.policy = Some(policy_check(PolicyStatus::Overridden, true));
            }
            let next = after_policy(state);
            set_status(state, next);
            Ok(())
        })
    }

    fn run_url(&self, workspace: &str, run_id: &str) -> String {
        format!("https://app.example/app/acme/workspaces/{workspace}/runs/{run_id}")
    }
}

// ── FakeLoader ────────────────────────────────────────────────────────────────

pub struct FakeLoader {
    files: Vec<PathBuf>,
}

impl FakeLoader {
    pub fn with_config() -> Self {
        Self {
            files: vec![PathBuf::from("main.tf")],
        }
    }

    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }
}

impl ConfigLoader for FakeLoader {
    fn load(&self, dir: &Path) -> Result<ConfigSnapshot> {
        Ok(ConfigSnapshot::new(dir, self.files.clone()))
    }
}

// ── ScriptedInput ─────────────────────────────────────────────────────────────

/// Answers prompts by id. An answer is consumed only when it is returned.
///
/// A `WAIT_FOR_EXTERNAL_UPDATE` answer never returns unless the input was
/// built with [`ScriptedInput::deferring`], which hands the token back.
pub struct ScriptedInput {
    answers: Mutex<HashMap<String, String>>,
    asked: Mutex<Vec<String>>,
    returns_wait: bool,
}

impl ScriptedInput {
    pub fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: Mutex::new(
                answers
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            asked: Mutex::new(Vec::new()),
            returns_wait: false,
        }
    }

    pub fn deferring(answers: &[(&str, &str)]) -> Self {
        Self {
            returns_wait: true,
            ..Self::new(answers)
        }
    }

    /// Answers never handed out.
    pub fn unused(&self) -> usize {
        self.answers.lock().expect("answers").len()
    }

    /// Prompt ids asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().expect("asked").clone()
    }
}

impl InputSink for ScriptedInput {
    fn ask<'a>(&'a self, prompt: &'a Prompt) -> BoxFuture<'a, Result<String>> {
        async move {
            self.asked.lock().expect("asked").push(prompt.id.to_string());
            let answer = self.answers.lock().expect("answers").get(prompt.id).cloned();
            match answer {
                Some(answer) if answer == WAIT_FOR_EXTERNAL_UPDATE && !self.returns_wait => {
                    std::future::pending::<()>().await;
                    Err(anyhow!("unreachable"))
                }
                Some(answer) => {
                    self.answers.lock().expect("answers").remove(prompt.id);
                    Ok(answer)
                }
                None => Err(anyhow!("no answer scripted for prompt {}", prompt.id)),
            }
        }
        .boxed()
    }
}

// ── RecordingOutput ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingOutput {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    flushed: AtomicBool,
}

impl RecordingOutput {
    pub fn text(&self) -> String {
        self.lines.lock().expect("lines").join("\n")
    }

    pub fn errors(&self) -> String {
        self.errors.lock().expect("errors").join("\n")
    }

    pub fn was_flushed(&self) -> bool {
        self.flushed.load(Ordering::SeqCst)
    }
}

impl OutputSink for RecordingOutput {
    fn output(&self, line: &str) {
        self.lines.lock().expect("lines").push(line.to_string());
    }

    fn error(&self, line: &str) {
        self.errors.lock().expect("errors").push(line.to_string());
    }

    fn flush(&self) {
        self.flushed.store(true, Ordering::SeqCst);
    }
}

// ── In-memory config store ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryConfigStore {
    pub config: Mutex<Option<RunwayConfig>>,
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<RunwayConfig> {
        Ok(self.config.lock().expect("config").clone().unwrap_or_default())
    }

    fn save(&self, config: &RunwayConfig) -> Result<()> {
        *self.config.lock().expect("config") = Some(config.clone());
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/memory/config.yaml"))
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

pub struct Harness {
    pub remote: Arc<FakeRemote>,
    pub output: Arc<RecordingOutput>,
    pub input: Option<Arc<ScriptedInput>>,
    pub orchestrator: Orchestrator<FakeRemote, FakeLoader>,
}

impl Harness {
    pub fn new(remote: FakeRemote, loader: FakeLoader) -> Self {
        Self::with_poll(remote, loader, POLL)
    }

    pub fn with_poll(remote: FakeRemote, loader: FakeLoader, poll_interval: Duration) -> Self {
        let remote = Arc::new(remote);
        let orchestrator = Orchestrator::new(
            Arc::clone(&remote),
            Arc::new(loader),
            OrchestratorSettings {
                poll_interval,
                max_poll_failures: 3,
            },
        );
        Self {
            remote,
            output: Arc::new(RecordingOutput::default()),
            input: None,
            orchestrator,
        }
    }

    pub fn scenario(scenario: Scenario) -> Self {
        Self::new(FakeRemote::with_scenario(scenario), FakeLoader::with_config())
    }

    pub fn answers(mut self, answers: &[(&str, &str)]) -> Self {
        self.input = Some(Arc::new(ScriptedInput::new(answers)));
        self
    }

    /// Like [`Harness::answers`], but a wait answer is returned to the caller.
    pub fn deferring(mut self, answers: &[(&str, &str)]) -> Self {
        self.input = Some(Arc::new(ScriptedInput::deferring(answers)));
        self
    }

    pub fn start(&self, spec: OperationSpec) -> OperationHandle {
        let mut request = OperationRequest::new(spec).with_output(self.output.clone());
        if let Some(input) = &self.input {
            request = request.with_input(input.clone());
        }
        self.orchestrator.start(request)
    }

    pub fn unused(&self) -> usize {
        self.input.as_ref().map_or(0, |i| i.unused())
    }

    pub fn asked(&self) -> Vec<String> {
        self.input.as_ref().map_or_else(Vec::new, |i| i.asked())
    }
}

pub fn apply_spec() -> OperationSpec {
    OperationSpec::builder(OperationKind::Apply, "prod").build()
}

pub fn plan_spec() -> OperationSpec {
    OperationSpec::builder(OperationKind::Plan, "prod").build()
}

/// Bounds a wait so a broken state machine fails the test instead of hanging.
pub async fn within<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .expect("operation did not complete in time")
}
