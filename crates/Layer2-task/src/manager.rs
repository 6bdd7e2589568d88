//! Task Manager - supervises many runners on behalf of a host
//!
//! Features:
//! - Submit raw input; invalid input is rejected synchronously
//! - Status, outcome and wait by task id
//! - Per-task cancellation and host shutdown (cancel all, wait all)

use crate::configuration::TaskInput;
use crate::observer::TaskObserver;
use crate::outcome::TaskOutcome;
use crate::runner::{TaskHandle, TaskRunner};
use crate::state::{RunnerState, TaskProgress};
use crate::task::TaskId;
use futures::future::join_all;
use remark_foundation::{ActionFailurePolicy, ContentActionService, Error, Result, RunnerSettings};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Configuration for task manager
#[derive(Debug, Clone, Default)]
pub struct TaskManagerConfig {
    /// Failure policy given to every runner
    pub failure_policy: ActionFailurePolicy,
}

impl TaskManagerConfig {
    pub fn from_settings(settings: &RunnerSettings) -> Self {
        Self {
            failure_policy: settings.failure_policy(),
        }
    }
}

/// Task status for external queries
#[derive(Debug, Clone)]
pub struct TaskStatus {
    pub id: TaskId,
    pub keyword: String,
    pub progress: TaskProgress,
}

struct ManagedTask {
    keyword: String,
    handle: TaskHandle,
}

/// Task Manager - handles task lifecycle for a host
#[derive(Clone)]
pub struct TaskManager {
    /// Shared content service
    service: Arc<dyn ContentActionService>,

    /// Observer handed to every runner
    observer: Option<Arc<dyn TaskObserver>>,

    /// All tasks by ID
    tasks: Arc<RwLock<HashMap<TaskId, ManagedTask>>>,

    /// Configuration
    config: Arc<TaskManagerConfig>,
}

impl TaskManager {
    /// Create a new task manager
    pub fn new(service: Arc<dyn ContentActionService>, config: TaskManagerConfig) -> Self {
        Self {
            service,
            observer: None,
            tasks: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    /// Set observer for all subsequently submitted tasks
    pub fn with_observer(mut self, observer: Arc<dyn TaskObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate input and start a task in the background.
    ///
    /// Invalid input returns `Error::InvalidInput` and starts nothing.
    pub async fn submit(&self, input: &TaskInput) -> Result<TaskId> {
        let mut runner =
            TaskRunner::new(Arc::clone(&self.service)).with_policy(self.config.failure_policy);
        if let Some(observer) = &self.observer {
            runner = runner.with_observer(Arc::clone(observer));
        }

        runner.configure_input(input)?;
        let handle = runner.start()?;
        let task_id = handle.id();

        let keyword = runner
            .config()
            .map(|c| c.keyword().to_string())
            .unwrap_or_default();

        {
            let mut tasks = self.tasks.write().await;
            tasks.insert(task_id, ManagedTask { keyword, handle });
        }

        info!("Submitted task {}", task_id);
        Ok(task_id)
    }

    async fn handle(&self, task_id: TaskId) -> Result<TaskHandle> {
        let tasks = self.tasks.read().await;
        tasks
            .get(&task_id)
            .map(|t| t.handle.clone())
            .ok_or_else(|| Error::NotFound(format!("Task {} not found", task_id)))
    }

    /// Current state of a task
    pub async fn state(&self, task_id: TaskId) -> Option<RunnerState> {
        let tasks = self.tasks.read().await;
        tasks.get(&task_id).map(|t| t.handle.state())
    }

    /// Get task status (state plus counters)
    pub async fn status(&self, task_id: TaskId) -> Option<TaskStatus> {
        let tasks = self.tasks.read().await;
        tasks.get(&task_id).map(|t| TaskStatus {
            id: task_id,
            keyword: t.keyword.clone(),
            progress: t.handle.progress(),
        })
    }

    /// All task statuses
    pub async fn statuses(&self) -> Vec<TaskStatus> {
        let tasks = self.tasks.read().await;
        tasks
            .iter()
            .map(|(id, t)| TaskStatus {
                id: *id,
                keyword: t.keyword.clone(),
                progress: t.handle.progress(),
            })
            .collect()
    }

    /// Terminal outcome, once the task has finished
    pub async fn outcome(&self, task_id: TaskId) -> Option<TaskOutcome> {
        let tasks = self.tasks.read().await;
        tasks.get(&task_id).and_then(|t| t.handle.outcome())
    }

    /// Wait for a task to finish
    pub async fn wait(&self, task_id: TaskId) -> Result<TaskOutcome> {
        // lock released before awaiting the worker
        let handle = self.handle(task_id).await?;
        handle.wait().await
    }

    /// Cancel a task. Finished tasks are left untouched.
    pub async fn cancel(&self, task_id: TaskId) -> Result<()> {
        let handle = self.handle(task_id).await?;

        if handle.state().is_terminal() {
            debug!("Task {} already finished; nothing to cancel", task_id);
            return Ok(());
        }

        handle.cancel();
        info!("Cancellation requested for task {}", task_id);
        Ok(())
    }

    /// Get count of running tasks
    pub async fn running_count(&self) -> usize {
        let tasks = self.tasks.read().await;
        tasks.values().filter(|t| t.handle.state().is_active()).count()
    }

    /// Cancel every active task and wait for all outcomes
    pub async fn shutdown(&self) -> Vec<TaskOutcome> {
        let handles: Vec<TaskHandle> = {
            let tasks = self.tasks.read().await;
            tasks.values().map(|t| t.handle.clone()).collect()
        };

        let active = handles.iter().filter(|h| !h.state().is_terminal()).count();
        if active > 0 {
            warn!("Shutting down with {} active tasks", active);
        }
        for handle in &handles {
            handle.cancel();
        }

        join_all(handles.iter().map(|h| h.wait()))
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    warn!("Task ended without an outcome: {}", e);
                    None
                }
            })
            .collect()
    }

    /// 완료된 태스크 정리
    ///
    /// Drops records of terminal tasks and returns how many were removed.
    pub async fn cleanup_finished(&self) -> usize {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, t| !t.handle.state().is_terminal());
        let removed = before - tasks.len();

        if removed > 0 {
            debug!("Cleaned up {} finished tasks", removed);
        }
        removed
    }
}
