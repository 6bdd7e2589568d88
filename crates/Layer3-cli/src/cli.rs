//! Command implementations

use remark_foundation::{ActionFailurePolicy, RunnerSettings, SettingsScope};
use remark_task::{
    collect_audience, ActionCounts, OutcomeState, RunnerState, SimulatedContentService, TaskId,
    TaskInput, TaskObserver, TaskOutcome, TaskRunner,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

const EXIT_SUCCEEDED: u8 = 0;

/// Exit code for a task that ended early
const EXIT_FAILED: u8 = 1;

/// Exit code for rejected input
const EXIT_INVALID: u8 = 2;

/// Prints runner progress to stderr
struct ConsoleObserver;

impl TaskObserver for ConsoleObserver {
    fn on_state_change(&self, task_id: TaskId, state: RunnerState) {
        eprintln!("[{}] {} {}", task_id, state.symbol(), state);
    }

    fn on_progress(&self, task_id: TaskId, counts: &ActionCounts) {
        eprintln!(
            "[{}]   {}/{} comments posted",
            task_id, counts.completed, counts.attempted
        );
    }

    fn on_complete(&self, _outcome: &TaskOutcome) {}
}

/// Run one comment task to its outcome. Ctrl-C cancels it.
pub async fn run_task(
    settings: &RunnerSettings,
    keyword: &str,
    comment: &str,
    count: i64,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let service = Arc::new(SimulatedContentService::from_settings(&settings.simulation));
    let mut runner = TaskRunner::new(service).with_policy(settings.failure_policy());
    if !json {
        runner = runner.with_observer(Arc::new(ConsoleObserver));
    }

    let input = TaskInput::new(keyword, comment, count);
    let outcome = match runner.configure_input(&input) {
        Ok(_) => {
            let handle = runner.start()?;
            tokio::select! {
                outcome = handle.wait() => outcome?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted; cancelling task {}", handle.id());
                    handle.cancel();
                    handle.wait().await?
                }
            }
        }
        Err(e) => match runner.outcome() {
            Some(outcome) => outcome,
            None => return Err(e.into()),
        },
    };

    report(&outcome, json)?;
    Ok(ExitCode::from(exit_status(&outcome)))
}

fn report(outcome: &TaskOutcome, json: bool) -> anyhow::Result<()> {
    println!("{}", render(outcome, json)?);
    Ok(())
}

/// Text printed for an outcome. The summary already carries the detail.
fn render(outcome: &TaskOutcome, json: bool) -> serde_json::Result<String> {
    if json {
        serde_json::to_string_pretty(outcome)
    } else {
        Ok(outcome.summary())
    }
}

fn exit_status(outcome: &TaskOutcome) -> u8 {
    match outcome.state {
        OutcomeState::Succeeded => EXIT_SUCCEEDED,
        OutcomeState::Failed(_) => EXIT_FAILED,
        OutcomeState::Invalid(_) => EXIT_INVALID,
    }
}

/// Collect commenters for a keyword and print them
pub async fn collect(
    settings: &RunnerSettings,
    keyword: &str,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let service = SimulatedContentService::from_settings(&settings.simulation);
    let report = collect_audience(&service, keyword, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "\n{} users from {} targets for '{}'\n",
        report.users.len(),
        report.targets_scanned,
        report.keyword
    );
    for user in &report.users {
        println!("  {}", user);
    }
    Ok(())
}

/// Change fields in one settings scope and save it.
///
/// Only the scope's own file is read, so values inherited from the other
/// scope are not copied into it.
pub fn update_settings(
    scope: SettingsScope,
    failure_policy: Option<ActionFailurePolicy>,
    default_count: Option<u32>,
) -> anyhow::Result<()> {
    let stored = RunnerSettings::load_scope(scope)?;
    let updated = apply_update(stored, failure_policy, default_count);
    let path = updated.save(scope)?;
    info!(%scope, path = %path.display(), "Settings saved");

    println!("{}", serde_json::to_string_pretty(&updated)?);
    Ok(())
}

fn apply_update(
    mut settings: RunnerSettings,
    failure_policy: Option<ActionFailurePolicy>,
    default_count: Option<u32>,
) -> RunnerSettings {
    if let Some(policy) = failure_policy {
        settings = settings.with_failure_policy(policy);
    }
    if let Some(count) = default_count {
        settings = settings.with_default_repeat_count(count);
    }
    settings
}
