//! Runner state machine

use crate::outcome::{ActionCounts, FailureReason, OutcomeState};
use serde::{Deserialize, Serialize};

/// Possible states of a task runner
///
/// ```text
/// Idle ─configure─► Configured ─start─► Discovering ─► Acting ─► Completed
///   │                                        │            │
///   └─(invalid)─► Rejected                   └────────────┴────► Failed(reason)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum RunnerState {
    /// Nothing configured yet
    Idle,

    /// Holding a valid configuration, not started
    Configured,

    /// Waiting on the discovery call
    Discovering,

    /// Submitting actions against discovered targets
    Acting,

    /// All actions issued
    Completed,

    /// Task ended early
    Failed(FailureReason),

    /// Configuration was invalid; discovery never ran
    Rejected,
}

impl RunnerState {
    /// Check if this is a terminal state (cannot transition further)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunnerState::Completed | RunnerState::Failed(_) | RunnerState::Rejected
        )
    }

    /// Check if a worker is currently executing
    pub fn is_active(&self) -> bool {
        matches!(self, RunnerState::Discovering | RunnerState::Acting)
    }

    /// Whether `configure()` is allowed from this state
    pub fn can_configure(&self) -> bool {
        !self.is_active()
    }

    /// Get display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            RunnerState::Idle => "Idle",
            RunnerState::Configured => "Configured",
            RunnerState::Discovering => "Discovering",
            RunnerState::Acting => "Acting",
            RunnerState::Completed => "Completed",
            RunnerState::Failed(_) => "Failed",
            RunnerState::Rejected => "Rejected",
        }
    }

    /// Get a symbol for the state
    pub fn symbol(&self) -> &'static str {
        match self {
            RunnerState::Idle => "◯",
            RunnerState::Configured => "◎",
            RunnerState::Discovering | RunnerState::Acting => "⟳",
            RunnerState::Completed => "✓",
            RunnerState::Failed(_) => "✗",
            RunnerState::Rejected => "⊘",
        }
    }
}

impl std::fmt::Display for RunnerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerState::Failed(reason) => write!(f, "Failed({})", reason),
            other => write!(f, "{}", other.display_name()),
        }
    }
}

impl From<&OutcomeState> for RunnerState {
    /// Terminal state matching an outcome
    fn from(state: &OutcomeState) -> Self {
        match state {
            OutcomeState::Succeeded => RunnerState::Completed,
            OutcomeState::Failed(reason) => RunnerState::Failed(*reason),
            OutcomeState::Invalid(_) => RunnerState::Rejected,
        }
    }
}

/// Live view of a running task: state plus counters so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub state: RunnerState,
    pub counts: ActionCounts,
}

impl Default for TaskProgress {
    fn default() -> Self {
        Self {
            state: RunnerState::Idle,
            counts: ActionCounts::default(),
        }
    }
}
