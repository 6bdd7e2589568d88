//! Terminal task outcome
//!
//! Exactly one [`TaskOutcome`] is produced per task execution.

use crate::configuration::ConfigurationError;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a task ended in failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Discovery call failed; no actions were attempted
    DiscoveryError,
    /// The action phase as a whole could not proceed
    ActionPhaseError,
    /// The host requested early termination
    Cancelled,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscoveryError => "discovery_error",
            Self::ActionPhaseError => "action_phase_error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final state carried by an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OutcomeState {
    Succeeded,
    Failed(FailureReason),
    Invalid(ConfigurationError),
}

/// Action counters, accumulated while the task runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    /// Targets returned by discovery
    pub discovered: usize,
    /// Submit calls issued
    pub attempted: usize,
    /// Submit calls the service reported as completed
    pub completed: usize,
}

impl ActionCounts {
    /// Attempts that did not complete
    pub fn failed(&self) -> usize {
        self.attempted.saturating_sub(self.completed)
    }
}

/// Result of one task execution, delivered once to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub state: OutcomeState,
    pub counts: ActionCounts,

    /// Error message behind a failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TaskOutcome {
    pub fn succeeded(task_id: TaskId, counts: ActionCounts, started_at: DateTime<Utc>) -> Self {
        Self {
            task_id,
            state: OutcomeState::Succeeded,
            counts,
            detail: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(
        task_id: TaskId,
        reason: FailureReason,
        counts: ActionCounts,
        detail: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            state: OutcomeState::Failed(reason),
            counts,
            detail,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Outcome for input rejected before any work started
    pub fn invalid(task_id: TaskId, error: ConfigurationError) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            detail: Some(error.to_string()),
            state: OutcomeState::Invalid(error),
            counts: ActionCounts::default(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.state, OutcomeState::Succeeded)
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.state {
            OutcomeState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Wall-clock run time
    pub fn duration(&self) -> std::time::Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// One-line summary for host display
    pub fn summary(&self) -> String {
        let c = &self.counts;
        match &self.state {
            OutcomeState::Succeeded => format!(
                "succeeded: {} targets, {}/{} comments posted",
                c.discovered, c.completed, c.attempted
            ),
            OutcomeState::Failed(reason) => format!(
                "failed ({}): {} targets, {}/{} comments posted{}",
                reason,
                c.discovered,
                c.completed,
                c.attempted,
                self.detail
                    .as_ref()
                    .map(|d| format!(" - {}", d))
                    .unwrap_or_default()
            ),
            OutcomeState::Invalid(error) => format!("invalid configuration: {}", error),
        }
    }
}
