// ============================================================================
// clipsmith-core/src/runner.rs
// ============================================================================
//
// TASK RUNNER: Executes a task graph in dependency order
//
// Tasks run in waves. Each wave holds every task whose dependencies have all
// succeeded; a wave runs in parallel on a rayon pool of `jobs` threads, or
// in order on the calling thread when `jobs` is 1. A failed task causes all
// of its transitive dependents to be skipped, while unrelated tasks still run.

use crate::error::{CoreError, CoreResult};
use crate::external::TaskExecutor;
use crate::tasks::{ForgeTask, TaskGraph, TaskId};

use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::PathBuf;

/// What happened to one task.
#[derive(Debug)]
pub enum TaskOutcome {
    Succeeded(PathBuf),
    Failed(CoreError),
    /// Not run because `blocked_by` failed.
    Skipped { blocked_by: TaskId },
}

impl TaskOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded(_))
    }
}

/// Outcome of every task of a graph, in task order.
#[derive(Debug)]
pub struct RunReport {
    outcomes: Vec<(TaskId, String, TaskOutcome)>,
}

impl RunReport {
    #[must_use]
    pub fn outcome(&self, id: TaskId) -> Option<&TaskOutcome> {
        self.outcomes
            .iter()
            .find(|(task, _, _)| *task == id)
            .map(|(_, _, outcome)| outcome)
    }

    /// `(id, task name, outcome)` for every task.
    pub fn outcomes(&self) -> impl Iterator<Item = (TaskId, &str, &TaskOutcome)> {
        self.outcomes
            .iter()
            .map(|(id, name, outcome)| (*id, name.as_str(), outcome))
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Succeeded(_)))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Failed(_)))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Skipped { .. }))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, _, o)| o.is_success())
    }

    fn count(&self, pred: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, _, o)| pred(o)).count()
    }

    /// The written paths in task order, or the first failure.
    pub fn into_result(self) -> CoreResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.outcomes.len());
        for (_, _, outcome) in self.outcomes {
            match outcome {
                TaskOutcome::Succeeded(path) => written.push(path),
                TaskOutcome::Failed(err) => return Err(err),
                TaskOutcome::Skipped { .. } => {}
            }
        }
        Ok(written)
    }
}

/// Runs task graphs with a bounded number of concurrent ffmpeg processes.
#[derive(Debug, Clone, Copy)]
pub struct TaskRunner {
    jobs: usize,
}

impl TaskRunner {
    /// A runner with `jobs` worker threads (at least one).
    #[must_use]
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    #[must_use]
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Executes every task of `graph`, calling `on_finish` as each task ends.
    ///
    /// # Errors
    ///
    /// Only fails if the thread pool cannot be created; task failures are
    /// recorded in the report.
    pub fn run<E, F>(&self, graph: &TaskGraph, executor: &E, on_finish: F) -> CoreResult<RunReport>
    where
        E: TaskExecutor + ?Sized,
        F: Fn(&ForgeTask, &TaskOutcome) + Sync,
    {
        let pool = if self.jobs > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.jobs)
                    .thread_name(|i| format!("clipsmith-worker-{i}"))
                    .build()
                    .map_err(|e| CoreError::Config(format!("Failed to create thread pool: {e}")))?,
            )
        } else {
            None
        };

        let mut outcomes: Vec<Option<TaskOutcome>> = (0..graph.len()).map(|_| None).collect();
        let mut wave_number = 0;

        loop {
            // Settle skips first so that they cascade within the same pass.
            for id in graph.topological_order() {
                if outcomes[id.index()].is_some() {
                    continue;
                }
                if let Some(blocked_by) = blocking_failure(graph, &outcomes, id) {
                    let outcome = TaskOutcome::Skipped { blocked_by };
                    if let Some(task) = graph.task(id) {
                        warn!("Skipping '{}': dependency {} failed", task.name, blocked_by);
                        on_finish(task, &outcome);
                    }
                    outcomes[id.index()] = Some(outcome);
                }
            }

            let ready: Vec<&ForgeTask> = graph
                .tasks()
                .iter()
                .filter(|task| outcomes[task.id.index()].is_none())
                .filter(|task| {
                    graph
                        .dependencies(task.id)
                        .iter()
                        .all(|dep| matches!(outcomes[dep.index()], Some(TaskOutcome::Succeeded(_))))
                })
                .collect();
            if ready.is_empty() {
                break;
            }

            wave_number += 1;
            debug!("Running wave {} with {} task(s)", wave_number, ready.len());

            let run_one = |task: &ForgeTask| {
                info!("Starting '{}'", task.name);
                let outcome = match executor.execute(task) {
                    Ok(path) => TaskOutcome::Succeeded(path),
                    Err(err) => TaskOutcome::Failed(err),
                };
                on_finish(task, &outcome);
                (task.id, outcome)
            };

            let finished: Vec<(TaskId, TaskOutcome)> = match &pool {
                Some(pool) => pool.install(|| ready.par_iter().map(|task| run_one(*task)).collect()),
                None => ready.iter().map(|task| run_one(*task)).collect(),
            };
            for (id, outcome) in finished {
                if matches!(outcome, TaskOutcome::Failed(_)) {
                    let blocked = graph.transitive_dependents(id).len();
                    if blocked > 0 {
                        warn!("{} dependent task(s) of {} will not run", blocked, id);
                    }
                }
                outcomes[id.index()] = Some(outcome);
            }
        }

        let outcomes = graph
            .tasks()
            .iter()
            .zip(outcomes)
            .map(|(task, outcome)| {
                let outcome = outcome.unwrap_or(TaskOutcome::Skipped { blocked_by: task.id });
                (task.id, task.name.clone(), outcome)
            })
            .collect();
        Ok(RunReport { outcomes })
    }
}

/// The failed task preventing `id` from running, if any.
fn blocking_failure(
    graph: &TaskGraph,
    outcomes: &[Option<TaskOutcome>],
    id: TaskId,
) -> Option<TaskId> {
    graph
        .dependencies(id)
        .into_iter()
        .find_map(|dep| match &outcomes[dep.index()] {
            Some(TaskOutcome::Failed(_)) => Some(dep),
            Some(TaskOutcome::Skipped { blocked_by }) => Some(*blocked_by),
            _ => None,
        })
}
