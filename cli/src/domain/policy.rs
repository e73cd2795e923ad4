//! Classification of policy-check verdicts.

use runway_common::{PolicyCheck, PolicyStatus};

/// Verdict of the policy check attached to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome {
    Passed { result: bool, description: String },
    /// Blocks the apply unless a human overrides it.
    SoftFailed {
        result: bool,
        description: String,
        can_override: bool,
    },
    HardFailed { result: bool, description: String },
}

impl PolicyOutcome {
    /// Classifies a policy check. `None` while the check is still running.
    #[must_use]
    pub fn from_check(check: &PolicyCheck) -> Option<Self> {
        let result = check.result;
        let description = check.description.clone();
        match check.status {
            PolicyStatus::Pending => None,
            PolicyStatus::Passed | PolicyStatus::Overridden => {
                Some(Self::Passed { result, description })
            }
            PolicyStatus::SoftFailed => Some(Self::SoftFailed {
                result,
                description,
                can_override: check.can_override,
            }),
            PolicyStatus::HardFailed | PolicyStatus::Errored => {
                Some(Self::HardFailed { result, description })
            }
        }
    }

    #[must_use]
    pub fn result(&self) -> bool {
        match self {
            Self::Passed { result, .. }
            | Self::SoftFailed { result, .. }
            | Self::HardFailed { result, .. } => *result,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Passed { description, .. }
            | Self::SoftFailed { description, .. }
            | Self::HardFailed { description, .. } => description,
        }
    }

    /// Lines printed when the verdict first becomes available.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .description()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        lines.push(format!("Policy Result: {}", self.result()));
        lines
    }
}
