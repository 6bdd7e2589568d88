//! Task observer (host notification sink)

use crate::outcome::{ActionCounts, TaskOutcome};
use crate::state::RunnerState;
use crate::task::TaskId;

/// Receives lifecycle notifications from runners.
///
/// `on_complete` is called exactly once per task, including for rejected
/// configurations. Callbacks run on the worker, so keep them short.
pub trait TaskObserver: Send + Sync {
    /// 태스크 상태 변경
    fn on_state_change(&self, _task_id: TaskId, _state: RunnerState) {}

    /// 진행 상황 업데이트 (submit 한 건마다)
    fn on_progress(&self, _task_id: TaskId, _counts: &ActionCounts) {}

    /// 태스크 완료
    fn on_complete(&self, outcome: &TaskOutcome);
}
