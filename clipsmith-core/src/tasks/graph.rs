// ============================================================================
// clipsmith-core/src/tasks/graph.rs
// ============================================================================
//
// TASK GRAPH: Explicit dependency graph of forge tasks
//
// Tasks are stored in insertion order and may only depend on tasks that were
// inserted before them, so the graph is acyclic by construction and the
// insertion order is already a valid topological order.

use super::{ForgeTask, TaskAction, TaskId};
use crate::error::{CoreError, CoreResult};
use crate::operation::LogLevel;

use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<ForgeTask>,
    dependencies: Vec<BTreeSet<TaskId>>,
}

impl TaskGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task that runs after every task in `depends_on`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TaskGraph` if a dependency is not part of the graph
    /// or another task already writes `output`.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        action: TaskAction,
        output: PathBuf,
        log_level: LogLevel,
        depends_on: &[TaskId],
    ) -> CoreResult<TaskId> {
        let id = TaskId(self.tasks.len());
        let name = name.into();

        if let Some(unknown) = depends_on.iter().find(|dep| dep.0 >= self.tasks.len()) {
            return Err(CoreError::TaskGraph(format!(
                "task '{name}' depends on unknown task {unknown}"
            )));
        }
        if let Some(existing) = self.tasks.iter().find(|t| t.output == output) {
            return Err(CoreError::TaskGraph(format!(
                "tasks '{}' and '{name}' both write {}",
                existing.name,
                output.display()
            )));
        }

        self.tasks.push(ForgeTask {
            id,
            name,
            action,
            output,
            log_level,
        });
        self.dependencies.push(depends_on.iter().copied().collect());
        Ok(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&ForgeTask> {
        self.tasks.get(id.0)
    }

    /// All tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[ForgeTask] {
        &self.tasks
    }

    /// Tasks that must finish before `id` can start.
    #[must_use]
    pub fn dependencies(&self, id: TaskId) -> Vec<TaskId> {
        self.dependencies
            .get(id.0)
            .map(|deps| deps.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Tasks that directly consume the output of `id`.
    #[must_use]
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        self.dependencies
            .iter()
            .enumerate()
            .filter(|(_, deps)| deps.contains(&id))
            .map(|(index, _)| TaskId(index))
            .collect()
    }

    /// Every task reachable from `id` through dependent edges.
    #[must_use]
    pub fn transitive_dependents(&self, id: TaskId) -> BTreeSet<TaskId> {
        let mut found = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for dependent in self.dependents(current) {
                if found.insert(dependent) {
                    stack.push(dependent);
                }
            }
        }
        found
    }

    /// A dependency-respecting order of all tasks.
    #[must_use]
    pub fn topological_order(&self) -> Vec<TaskId> {
        (0..self.tasks.len()).map(TaskId).collect()
    }
}
