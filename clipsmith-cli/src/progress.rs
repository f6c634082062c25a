// ============================================================================
// clipsmith-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: task progress bar for `forge`
//
// One tick per finished task. Failures and skips are printed above the bar
// so they stay visible once the bar is cleared.

use clipsmith_core::{ForgeTask, TaskOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;

use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tasks {msg}";

/// Progress bar tracking finished tasks of a run.
#[derive(Debug, Clone)]
pub struct TaskProgress {
    bar: ProgressBar,
}

impl TaskProgress {
    /// Creates a bar for `total` tasks. A hidden bar is used when `visible` is false.
    pub fn new(total: usize, visible: bool) -> Self {
        let bar = ProgressBar::with_draw_target(
            Some(total as u64),
            if visible {
                ProgressDrawTarget::stderr()
            } else {
                ProgressDrawTarget::hidden()
            },
        );
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░ "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Records a finished task.
    pub fn task_finished(&self, task: &ForgeTask, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Succeeded(_) => {
                self.bar.set_message(task.name.clone());
            }
            TaskOutcome::Failed(e) => {
                self.bar
                    .println(format!("{} {}: {}", "failed".red().bold(), task.name, e));
            }
            TaskOutcome::Skipped { .. } => {
                self.bar
                    .println(format!("{} {}", "skipped".yellow(), task.name));
            }
        }
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsmith_core::{CoreError, LogLevel, TaskAction, TaskGraph};
    use std::path::PathBuf;

    #[test]
    fn test_every_outcome_advances_the_bar() {
        let mut graph = TaskGraph::new();
        let id = graph
            .add_task(
                "concat",
                TaskAction::Concat { inputs: vec![PathBuf::from("a.mp4")] },
                PathBuf::from("out.mp4"),
                LogLevel::Info,
                &[],
            )
            .unwrap();
        let task = graph.task(id).unwrap().clone();

        let progress = TaskProgress::new(3, false);
        progress.task_finished(&task, &TaskOutcome::Succeeded(PathBuf::from("out.mp4")));
        progress.task_finished(&task, &TaskOutcome::Failed(CoreError::NoOutputTasks));
        progress.task_finished(&task, &TaskOutcome::Skipped { blocked_by: id });
        assert_eq!(progress.position(), 3);
        progress.finish();
    }
}
