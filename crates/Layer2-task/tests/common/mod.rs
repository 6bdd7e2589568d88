//! Shared test doubles for runner/manager integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use remark_foundation::{ContentActionService, ServiceError, Target};
use remark_task::{ActionCounts, RunnerState, TaskHandle, TaskId, TaskObserver, TaskOutcome};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Pause point inside a submit call
pub struct Pause {
    pub call: usize,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Content service whose behavior is scripted per call
pub struct ScriptedService {
    discover_result: Result<Vec<Target>, ServiceError>,
    /// 1-based submit call numbers that report a per-action failure
    failing_calls: HashSet<usize>,
    /// Submit call number from which the service is unavailable
    unavailable_from: Option<usize>,
    pause: Option<Pause>,
    /// Pause inside the discovery call (`call` is ignored)
    discover_pause: Option<Pause>,
    /// Submit call number that panics
    panic_at: Option<usize>,
    panic_in_discovery: bool,
    /// Cancel the handle in `cancel_slot` once this many submits completed
    cancel_after: Option<usize>,
    pub cancel_slot: Arc<Mutex<Option<TaskHandle>>>,

    pub discover_calls: AtomicUsize,
    pub keywords: Mutex<Vec<String>>,
    pub submits: Mutex<Vec<(String, String)>>,
}

impl ScriptedService {
    pub fn with_targets(targets: &[&str]) -> Self {
        Self {
            discover_result: Ok(targets.iter().map(|t| Target::from(*t)).collect()),
            failing_calls: HashSet::new(),
            unavailable_from: None,
            pause: None,
            discover_pause: None,
            panic_at: None,
            panic_in_discovery: false,
            cancel_after: None,
            cancel_slot: Arc::new(Mutex::new(None)),
            discover_calls: AtomicUsize::new(0),
            keywords: Mutex::new(Vec::new()),
            submits: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_discovery(error: ServiceError) -> Self {
        let mut service = Self::with_targets(&[]);
        service.discover_result = Err(error);
        service
    }

    pub fn fail_calls(mut self, calls: &[usize]) -> Self {
        self.failing_calls = calls.iter().copied().collect();
        self
    }

    pub fn unavailable_from(mut self, call: usize) -> Self {
        self.unavailable_from = Some(call);
        self
    }

    pub fn pause_at(mut self, pause: Pause) -> Self {
        self.pause = Some(pause);
        self
    }

    pub fn pause_discovery(mut self, pause: Pause) -> Self {
        self.discover_pause = Some(pause);
        self
    }

    pub fn panic_at(mut self, call: usize) -> Self {
        self.panic_at = Some(call);
        self
    }

    pub fn panic_in_discovery(mut self) -> Self {
        self.panic_in_discovery = true;
        self
    }

    pub fn cancel_after(mut self, completed_calls: usize) -> Self {
        self.cancel_after = Some(completed_calls);
        self
    }

    pub fn discover_count(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    /// Target ids in submit order
    pub fn submitted_targets(&self) -> Vec<String> {
        self.submits
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }
}

#[async_trait]
impl ContentActionService for ScriptedService {
    async fn discover(&self, keyword: &str) -> Result<Vec<Target>, ServiceError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        self.keywords.lock().unwrap().push(keyword.to_string());

        if let Some(pause) = &self.discover_pause {
            pause.entered.notify_one();
            pause.release.notified().await;
        }
        if self.panic_in_discovery {
            panic!("search index corrupted");
        }
        self.discover_result.clone()
    }

    async fn submit(&self, target: &Target, text: &str) -> Result<(), ServiceError> {
        let call = {
            let mut submits = self.submits.lock().unwrap();
            submits.push((target.to_string(), text.to_string()));
            submits.len()
        };

        if let Some(pause) = &self.pause {
            if pause.call == call {
                pause.entered.notify_one();
                pause.release.notified().await;
            }
        }

        if self.panic_at == Some(call) {
            panic!("submit {} blew up", call);
        }

        if self.cancel_after == Some(call) {
            if let Some(handle) = self.cancel_slot.lock().unwrap().as_ref() {
                handle.cancel();
            }
        }

        if self.unavailable_from.is_some_and(|from| call >= from) {
            return Err(ServiceError::unavailable("catalog offline"));
        }
        if self.failing_calls.contains(&call) {
            return Err(ServiceError::failed(format!("call {} rejected", call)));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Observer that records every notification
#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<(TaskId, RunnerState)>>,
    pub progress: Mutex<Vec<ActionCounts>>,
    pub completions: Mutex<Vec<TaskOutcome>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<RunnerState> {
        self.states.lock().unwrap().iter().map(|(_, s)| *s).collect()
    }

    pub fn completions(&self) -> Vec<TaskOutcome> {
        self.completions.lock().unwrap().clone()
    }
}

impl TaskObserver for RecordingObserver {
    fn on_state_change(&self, task_id: TaskId, state: RunnerState) {
        self.states.lock().unwrap().push((task_id, state));
    }

    fn on_progress(&self, _task_id: TaskId, counts: &ActionCounts) {
        self.progress.lock().unwrap().push(*counts);
    }

    fn on_complete(&self, outcome: &TaskOutcome) {
        self.completions.lock().unwrap().push(outcome.clone());
    }
}
