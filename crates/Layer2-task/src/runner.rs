//! Task Runner - drives one configuration through discovery and action phases
//!
//! Features:
//! - Validation gate at `configure()`; invalid input never reaches the service
//! - Background execution on a spawned tokio task
//! - Sequential, ordered submits with per-attempt failure accounting
//! - Cooperative cancellation (in-flight submit is allowed to finish)
//! - Exactly one `TaskOutcome` per task, via `TaskHandle` and `TaskObserver`

use crate::configuration::{TaskConfiguration, TaskInput};
use crate::observer::TaskObserver;
use crate::outcome::{ActionCounts, FailureReason, TaskOutcome};
use crate::state::{RunnerState, TaskProgress};
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::RwLock;
use remark_foundation::{ActionFailurePolicy, ContentActionService, Error, Result};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// State shared by the runner, its worker and every handle.
///
/// A terminal state and its outcome are always written together.
#[derive(Debug, Default)]
struct Shared {
    progress: TaskProgress,
    outcome: Option<TaskOutcome>,
}

/// Handle to a started task
///
/// Cheap to clone; every clone observes the same task.
#[derive(Clone)]
pub struct TaskHandle {
    task_id: TaskId,
    shared: Arc<RwLock<Shared>>,
    cancel: CancellationToken,
    done: watch::Receiver<bool>,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.task_id
    }

    /// Current runner state
    pub fn state(&self) -> RunnerState {
        self.shared.read().progress.state
    }

    /// Current state and counters
    pub fn progress(&self) -> TaskProgress {
        self.shared.read().progress
    }

    /// Request early termination.
    ///
    /// No new submits are issued after this; a submit already in flight
    /// finishes and is counted. Has no effect once the task is terminal.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Terminal outcome, present exactly when the state is terminal
    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.shared.read().outcome.clone()
    }

    /// Wait for the terminal outcome
    pub async fn wait(&self) -> Result<TaskOutcome> {
        let mut done = self.done.clone();
        done.wait_for(|finished| *finished).await.map_err(|_| {
            Error::Task(format!(
                "task {} worker stopped without an outcome",
                self.task_id
            ))
        })?;

        self.outcome()
            .ok_or_else(|| Error::Internal(format!("task {} outcome missing", self.task_id)))
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("task_id", &self.task_id)
            .field("progress", &self.progress())
            .finish()
    }
}

/// Task runner - owns the lifecycle of one configuration at a time
pub struct TaskRunner {
    /// Content service (owned by the host)
    service: Arc<dyn ContentActionService>,

    /// Reaction to failed submits
    policy: ActionFailurePolicy,

    /// Optional notification sink
    observer: Option<Arc<dyn TaskObserver>>,

    /// Identity of the current configuration
    task_id: TaskId,

    /// State shared with the worker and handles
    shared: Arc<RwLock<Shared>>,

    /// Current configuration
    config: Option<TaskConfiguration>,

    /// Handle of the started task
    handle: Option<TaskHandle>,
}

impl TaskRunner {
    /// Create an idle runner
    pub fn new(service: Arc<dyn ContentActionService>) -> Self {
        Self {
            service,
            policy: ActionFailurePolicy::default(),
            observer: None,
            task_id: TaskId::new(),
            shared: Arc::new(RwLock::new(Shared::default())),
            config: None,
            handle: None,
        }
    }

    /// Set failure policy
    pub fn with_policy(mut self, policy: ActionFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set observer
    pub fn with_observer(mut self, observer: Arc<dyn TaskObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn id(&self) -> TaskId {
        self.task_id
    }

    pub fn state(&self) -> RunnerState {
        self.shared.read().progress.state
    }

    pub fn progress(&self) -> TaskProgress {
        self.shared.read().progress
    }

    pub fn config(&self) -> Option<&TaskConfiguration> {
        self.config.as_ref()
    }

    pub fn policy(&self) -> ActionFailurePolicy {
        self.policy
    }

    /// Handle of the started task, if any
    pub fn handle(&self) -> Option<&TaskHandle> {
        self.handle.as_ref()
    }

    /// Terminal outcome of the current configuration, if reached
    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.shared.read().outcome.clone()
    }

    // ========================================================================
    // Configure
    // ========================================================================

    /// Load a validated configuration and move to `Configured`.
    ///
    /// Allowed from any non-running state; a terminal runner is reset under a
    /// fresh task id.
    pub fn configure(&mut self, config: TaskConfiguration) -> Result<TaskId> {
        self.ensure_configurable()?;
        self.reset();

        info!(
            task_id = %self.task_id,
            keyword = config.keyword(),
            repeat_count = config.repeat_count(),
            "Task configured"
        );
        self.config = Some(config);
        transition(
            &self.shared,
            self.observer.as_deref(),
            self.task_id,
            RunnerState::Configured,
        );

        Ok(self.task_id)
    }

    /// Validate raw input and configure.
    ///
    /// Invalid input moves the runner to `Rejected`, reports an `Invalid`
    /// outcome to the observer, and returns `Error::InvalidInput`. The
    /// content service is never touched.
    pub fn configure_input(&mut self, input: &TaskInput) -> Result<TaskId> {
        self.ensure_configurable()?;

        match input.validate() {
            Ok(config) => self.configure(config),
            Err(error) => {
                self.reset();
                warn!(task_id = %self.task_id, %error, "Task configuration rejected");

                let outcome = TaskOutcome::invalid(self.task_id, error.clone());
                publish(&self.shared, self.observer.as_deref(), &outcome);

                Err(error.into())
            }
        }
    }

    fn ensure_configurable(&self) -> Result<()> {
        let state = self.state();
        if !state.can_configure() {
            return Err(Error::InvalidState(format!(
                "task {} is {}; wait for it to finish before reconfiguring",
                self.task_id, state
            )));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.task_id = TaskId::new();
        self.shared = Arc::new(RwLock::new(Shared::default()));
        self.config = None;
        self.handle = None;
    }

    // ========================================================================
    // Execute
    // ========================================================================

    /// Start the configured task on a background tokio task.
    ///
    /// Returns immediately. Must be called within a tokio runtime.
    pub fn start(&mut self) -> Result<TaskHandle> {
        let state = self.state();
        if state != RunnerState::Configured {
            return Err(Error::InvalidState(format!(
                "task {} cannot start from {}",
                self.task_id, state
            )));
        }
        let config = self.config.clone().ok_or_else(|| {
            Error::InvalidState(format!("task {} has no configuration", self.task_id))
        })?;

        let cancel = CancellationToken::new();
        let (done_tx, done_rx) = watch::channel(false);

        transition(
            &self.shared,
            self.observer.as_deref(),
            self.task_id,
            RunnerState::Discovering,
        );

        let execution = Execution {
            task_id: self.task_id,
            config,
            service: Arc::clone(&self.service),
            policy: self.policy,
            observer: self.observer.clone(),
            shared: Arc::clone(&self.shared),
            cancel: cancel.clone(),
            started_at: Utc::now(),
        };

        tokio::spawn(async move {
            // a panicking collaborator still ends the task with an outcome
            let outcome = match AssertUnwindSafe(execution.run()).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => execution.panicked(panic_message(panic.as_ref())),
            };
            info!(
                task_id = %outcome.task_id,
                state = ?outcome.state,
                discovered = outcome.counts.discovered,
                attempted = outcome.counts.attempted,
                completed = outcome.counts.completed,
                "Task finished"
            );
            publish(&execution.shared, execution.observer.as_deref(), &outcome);
            done_tx.send_replace(true);
        });

        let handle = TaskHandle {
            task_id: self.task_id,
            shared: Arc::clone(&self.shared),
            cancel,
            done: done_rx,
        };
        self.handle = Some(handle.clone());

        Ok(handle)
    }

    /// Start and wait for the outcome
    pub async fn run(&mut self) -> Result<TaskOutcome> {
        self.start()?.wait().await
    }

    /// Request cancellation of the started task
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.cancel();
        }
    }
}

fn transition(
    shared: &RwLock<Shared>,
    observer: Option<&dyn TaskObserver>,
    task_id: TaskId,
    state: RunnerState,
) {
    shared.write().progress.state = state;
    debug!(task_id = %task_id, state = %state, "State changed");
    if let Some(observer) = observer {
        observer.on_state_change(task_id, state);
    }
}

/// Record the outcome together with its terminal state, then notify
fn publish(shared: &RwLock<Shared>, observer: Option<&dyn TaskObserver>, outcome: &TaskOutcome) {
    let state = RunnerState::from(&outcome.state);
    {
        let mut shared = shared.write();
        shared.progress.state = state;
        shared.outcome = Some(outcome.clone());
    }
    debug!(task_id = %outcome.task_id, state = %state, "State changed");

    if let Some(observer) = observer {
        observer.on_state_change(outcome.task_id, state);
        observer.on_complete(outcome);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Everything the worker needs, moved onto the background task
struct Execution {
    task_id: TaskId,
    config: TaskConfiguration,
    service: Arc<dyn ContentActionService>,
    policy: ActionFailurePolicy,
    observer: Option<Arc<dyn TaskObserver>>,
    shared: Arc<RwLock<Shared>>,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
}

impl Execution {
    /// Run both phases. The terminal state is left to `publish`.
    async fn run(&self) -> TaskOutcome {
        // Discovery phase
        info!(
            task_id = %self.task_id,
            keyword = self.config.keyword(),
            service = self.service.name(),
            "Discovering targets"
        );
        let targets = match self.service.discover(self.config.keyword()).await {
            Ok(targets) => targets,
            Err(e) => {
                warn!(task_id = %self.task_id, error = %e, "Discovery failed");
                return self.fail(FailureReason::DiscoveryError, Some(e.to_string()));
            }
        };
        self.update_counts(|c| c.discovered = targets.len());

        if self.cancel.is_cancelled() {
            info!(task_id = %self.task_id, "Cancelled after discovery");
            return self.fail(FailureReason::Cancelled, None);
        }

        // Action phase
        self.transition(RunnerState::Acting);
        info!(
            task_id = %self.task_id,
            targets = targets.len(),
            repeat_count = self.config.repeat_count(),
            "Submitting comments"
        );

        for target in &targets {
            for attempt in 1..=self.config.repeat_count() {
                if self.cancel.is_cancelled() {
                    info!(task_id = %self.task_id, %target, attempt, "Cancelled; no further submits");
                    return self.fail(FailureReason::Cancelled, None);
                }

                let result = self.service.submit(target, self.config.comment_text()).await;
                let counts = self.update_counts(|c| {
                    c.attempted += 1;
                    if result.is_ok() {
                        c.completed += 1;
                    }
                });
                if let Some(observer) = &self.observer {
                    observer.on_progress(self.task_id, &counts);
                }

                match result {
                    Ok(()) => {
                        debug!(task_id = %self.task_id, %target, attempt, "Comment submitted");
                    }
                    Err(e) if e.is_unavailable() => {
                        warn!(task_id = %self.task_id, %target, error = %e, "Service unavailable during action phase");
                        return self.fail(FailureReason::ActionPhaseError, Some(e.to_string()));
                    }
                    Err(e) => {
                        warn!(task_id = %self.task_id, %target, attempt, error = %e, "Comment submission failed");
                        if self.policy == ActionFailurePolicy::Abort {
                            return self.fail(
                                FailureReason::ActionPhaseError,
                                Some(format!("submit to {} failed: {}", target, e)),
                            );
                        }
                    }
                }
            }
        }

        TaskOutcome::succeeded(self.task_id, self.counts(), self.started_at)
    }

    /// Outcome for a worker that panicked mid-phase
    fn panicked(&self, message: String) -> TaskOutcome {
        let reason = match self.shared.read().progress.state {
            RunnerState::Discovering => FailureReason::DiscoveryError,
            _ => FailureReason::ActionPhaseError,
        };
        error!(task_id = %self.task_id, panic = %message, %reason, "Content service panicked");
        self.fail(reason, Some(format!("content service panicked: {}", message)))
    }

    fn fail(&self, reason: FailureReason, detail: Option<String>) -> TaskOutcome {
        TaskOutcome::failed(self.task_id, reason, self.counts(), detail, self.started_at)
    }

    fn transition(&self, state: RunnerState) {
        transition(&self.shared, self.observer.as_deref(), self.task_id, state);
    }

    fn counts(&self) -> ActionCounts {
        self.shared.read().progress.counts
    }

    fn update_counts(&self, f: impl FnOnce(&mut ActionCounts)) -> ActionCounts {
        let mut shared = self.shared.write();
        f(&mut shared.progress.counts);
        shared.progress.counts
    }
}
