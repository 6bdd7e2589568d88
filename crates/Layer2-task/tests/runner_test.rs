//! Runner 통합 테스트 - 스크립트된 서비스로 실행 흐름 검증
//!
//! `cargo test -p remark-task --test runner_test`

mod common;

use common::{Pause, RecordingObserver, ScriptedService};
use remark_foundation::{ActionFailurePolicy, Error, ServiceError};
use remark_task::{
    ConfigurationError, FailureReason, OutcomeState, RunnerState, TaskHandle, TaskId, TaskInput,
    TaskObserver, TaskOutcome, TaskRunner,
};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn runner_with(service: &Arc<ScriptedService>, observer: &Arc<RecordingObserver>) -> TaskRunner {
    TaskRunner::new(service.clone()).with_observer(observer.clone() as Arc<dyn TaskObserver>)
}

#[tokio::test]
async fn test_invalid_input_never_reaches_service() {
    let service = Arc::new(ScriptedService::with_targets(&["A"]));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    let err = runner
        .configure_input(&TaskInput::new("cats", "hi", 0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(runner.state(), RunnerState::Rejected);

    assert_eq!(service.discover_count(), 0);
    assert!(service.submitted_targets().is_empty());

    let completions = observer.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(
        completions[0].state,
        OutcomeState::Invalid(ConfigurationError::NonPositiveRepeatCount(0))
    );
}

#[tokio::test]
async fn test_submits_every_target_repeat_count_times_in_order() {
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner
        .configure_input(&TaskInput::new("  cats ", "nice video", 3))
        .expect("configure failed");
    let outcome = runner.run().await.expect("run failed");

    assert!(outcome.is_success());
    assert_eq!(outcome.counts.discovered, 2);
    assert_eq!(outcome.counts.attempted, 6);
    assert_eq!(outcome.counts.completed, 6);

    assert_eq!(*service.keywords.lock().unwrap(), vec!["cats".to_string()]);
    assert_eq!(
        service.submitted_targets(),
        vec!["A", "A", "A", "B", "B", "B"]
    );
    assert!(service
        .submits
        .lock()
        .unwrap()
        .iter()
        .all(|(_, text)| text == "nice video"));

    assert_eq!(
        observer.states(),
        vec![
            RunnerState::Configured,
            RunnerState::Discovering,
            RunnerState::Acting,
            RunnerState::Completed,
        ]
    );
    assert_eq!(observer.progress.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn test_empty_discovery_succeeds_without_submits() {
    let service = Arc::new(ScriptedService::with_targets(&[]));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner
        .configure_input(&TaskInput::new("nothing", "hi", 5))
        .unwrap();
    let outcome = runner.run().await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.counts.discovered, 0);
    assert_eq!(outcome.counts.attempted, 0);
    assert_eq!(outcome.counts.completed, 0);
    assert!(service.submitted_targets().is_empty());
}

#[tokio::test]
async fn test_discovery_failure() {
    let service = Arc::new(ScriptedService::failing_discovery(ServiceError::failed(
        "search broke",
    )));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 2)).unwrap();
    let outcome = runner.run().await.unwrap();

    assert_eq!(
        outcome.state,
        OutcomeState::Failed(FailureReason::DiscoveryError)
    );
    assert!(outcome.detail.as_deref().unwrap_or_default().contains("search broke"));
    assert!(service.submitted_targets().is_empty());
    assert_eq!(
        runner.state(),
        RunnerState::Failed(FailureReason::DiscoveryError)
    );
    assert!(!observer.states().contains(&RunnerState::Acting));
}

#[tokio::test]
async fn test_individual_failures_do_not_abort_by_default() {
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]).fail_calls(&[2, 5]));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 3)).unwrap();
    let outcome = runner.run().await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.counts.attempted, 6);
    assert_eq!(outcome.counts.completed, 4);
    assert_eq!(outcome.counts.failed(), 2);
}

#[tokio::test]
async fn test_abort_policy_stops_on_first_failure() {
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]).fail_calls(&[2]));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer).with_policy(ActionFailurePolicy::Abort);

    runner.configure_input(&TaskInput::new("cats", "hi", 3)).unwrap();
    let outcome = runner.run().await.unwrap();

    assert_eq!(
        outcome.state,
        OutcomeState::Failed(FailureReason::ActionPhaseError)
    );
    assert_eq!(outcome.counts.attempted, 2);
    assert_eq!(outcome.counts.completed, 1);
    assert_eq!(service.submitted_targets().len(), 2);
}

#[tokio::test]
async fn test_unavailable_service_fails_action_phase() {
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]).unavailable_from(4));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 3)).unwrap();
    let outcome = runner.run().await.unwrap();

    assert_eq!(
        outcome.state,
        OutcomeState::Failed(FailureReason::ActionPhaseError)
    );
    assert_eq!(outcome.counts.attempted, 4);
    assert_eq!(outcome.counts.completed, 3);
    assert_eq!(service.submitted_targets().len(), 4);
}

#[tokio::test]
async fn test_cancel_between_targets() {
    // cancel lands right after A's third submit completes
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]).cancel_after(3));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 3)).unwrap();
    let handle = runner.start().unwrap();
    *service.cancel_slot.lock().unwrap() = Some(handle.clone());

    let outcome = handle.wait().await.unwrap();

    assert_eq!(outcome.state, OutcomeState::Failed(FailureReason::Cancelled));
    assert_eq!(outcome.counts.attempted, 3);
    assert_eq!(service.submitted_targets(), vec!["A", "A", "A"]);
    assert_eq!(handle.state(), RunnerState::Failed(FailureReason::Cancelled));
}

#[tokio::test]
async fn test_in_flight_submit_finishes_after_cancel() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]).pause_at(Pause {
        call: 4,
        entered: entered.clone(),
        release: release.clone(),
    }));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 3)).unwrap();
    let handle = runner.start().unwrap();

    entered.notified().await;
    assert_eq!(handle.state(), RunnerState::Acting);
    handle.cancel();
    assert!(handle.is_cancel_requested());
    release.notify_one();

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.state, OutcomeState::Failed(FailureReason::Cancelled));
    // first B submit was already in flight and is counted
    assert_eq!(outcome.counts.attempted, 4);
    assert_eq!(outcome.counts.completed, 4);
    assert_eq!(service.submitted_targets(), vec!["A", "A", "A", "B"]);
}

#[tokio::test]
async fn test_observer_sees_exactly_one_outcome() {
    let service = Arc::new(ScriptedService::with_targets(&["A"]));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 2)).unwrap();
    let handle = runner.start().unwrap();
    let outcome = handle.wait().await.unwrap();

    // a late cancel has no effect on a finished task
    handle.cancel();
    assert_eq!(handle.outcome(), Some(outcome.clone()));
    assert_eq!(handle.wait().await.unwrap(), outcome);

    let completions = observer.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0], outcome);
    assert_eq!(runner.state(), RunnerState::Completed);
}

#[tokio::test]
async fn test_configure_refused_while_running() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let service = Arc::new(ScriptedService::with_targets(&["A"]).pause_at(Pause {
        call: 1,
        entered: entered.clone(),
        release: release.clone(),
    }));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 1)).unwrap();
    let handle = runner.start().unwrap();
    entered.notified().await;

    let err = runner
        .configure_input(&TaskInput::new("dogs", "hi", 1))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert!(matches!(runner.start(), Err(Error::InvalidState(_))));

    release.notify_one();
    let outcome = handle.wait().await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(runner.config().unwrap().keyword(), "cats");
}

#[tokio::test]
async fn test_cancel_during_discovery_applies_after_it_returns() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let service = Arc::new(ScriptedService::with_targets(&["A", "B", "C"]).pause_discovery(
        Pause {
            call: 1,
            entered: entered.clone(),
            release: release.clone(),
        },
    ));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 2)).unwrap();
    let handle = runner.start().unwrap();

    entered.notified().await;
    assert_eq!(handle.state(), RunnerState::Discovering);
    handle.cancel();
    release.notify_one();

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.state, OutcomeState::Failed(FailureReason::Cancelled));
    assert_eq!(outcome.counts.discovered, 3);
    assert_eq!(outcome.counts.attempted, 0);
    assert!(service.submitted_targets().is_empty());
    assert!(!observer.states().contains(&RunnerState::Acting));
}

#[tokio::test]
async fn test_panicking_submit_fails_action_phase() {
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]).panic_at(3));
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 2)).unwrap();
    let outcome = runner.run().await.expect("worker must still report an outcome");

    assert_eq!(
        outcome.state,
        OutcomeState::Failed(FailureReason::ActionPhaseError)
    );
    assert_eq!(outcome.counts.attempted, 2);
    assert_eq!(outcome.counts.completed, 2);
    assert!(outcome
        .detail
        .as_deref()
        .unwrap_or_default()
        .contains("submit 3 blew up"));
    assert_eq!(
        runner.state(),
        RunnerState::Failed(FailureReason::ActionPhaseError)
    );
    assert_eq!(observer.completions(), vec![outcome]);

    // the runner is reusable afterwards
    runner
        .configure_input(&TaskInput::new("dogs", "hi", 1))
        .expect("reconfigure after panic");
    assert_eq!(runner.state(), RunnerState::Configured);
}

#[tokio::test]
async fn test_panicking_discovery_is_discovery_error() {
    let service = Arc::new(ScriptedService::with_targets(&["A"]).panic_in_discovery());
    let observer = Arc::new(RecordingObserver::default());
    let mut runner = runner_with(&service, &observer);

    runner.configure_input(&TaskInput::new("cats", "hi", 1)).unwrap();
    let outcome = runner.run().await.unwrap();

    assert_eq!(
        outcome.state,
        OutcomeState::Failed(FailureReason::DiscoveryError)
    );
    assert!(outcome
        .detail
        .as_deref()
        .unwrap_or_default()
        .contains("search index corrupted"));
    assert!(service.submitted_targets().is_empty());
    assert_eq!(observer.completions().len(), 1);
}

/// Reads the handle from inside notifications
#[derive(Default)]
struct HandleReader {
    handle: Mutex<Option<TaskHandle>>,
    /// (state reported, state on handle, outcome visible on handle)
    seen: Mutex<Vec<(RunnerState, RunnerState, bool)>>,
    outcome_visible_on_complete: Mutex<Option<bool>>,
}

impl TaskObserver for HandleReader {
    fn on_state_change(&self, _task_id: TaskId, state: RunnerState) {
        if let Some(handle) = self.handle.lock().unwrap().as_ref() {
            self.seen
                .lock()
                .unwrap()
                .push((state, handle.state(), handle.outcome().is_some()));
        }
    }

    fn on_complete(&self, _outcome: &TaskOutcome) {
        if let Some(handle) = self.handle.lock().unwrap().as_ref() {
            *self.outcome_visible_on_complete.lock().unwrap() = Some(handle.outcome().is_some());
        }
    }
}

#[tokio::test]
async fn test_terminal_state_and_outcome_are_visible_together() {
    let service = Arc::new(ScriptedService::with_targets(&["A", "B"]));
    let reader = Arc::new(HandleReader::default());
    let mut runner =
        TaskRunner::new(service.clone()).with_observer(reader.clone() as Arc<dyn TaskObserver>);

    runner.configure_input(&TaskInput::new("cats", "hi", 2)).unwrap();
    let handle = runner.start().unwrap();
    *reader.handle.lock().unwrap() = Some(handle.clone());

    let outcome = handle.wait().await.unwrap();
    assert!(outcome.is_success());

    let seen = reader.seen.lock().unwrap().clone();
    assert!(!seen.is_empty());
    for (reported, on_handle, outcome_visible) in seen {
        assert_eq!(reported, on_handle);
        // an outcome exists exactly when the state is terminal
        assert_eq!(on_handle.is_terminal(), outcome_visible);
    }
    assert_eq!(*reader.outcome_visible_on_complete.lock().unwrap(), Some(true));
    assert_eq!(handle.state(), RunnerState::Completed);
}
