//! Transcode tasks and the graph that orders them.
//!
//! A forge operation becomes a set of [`ForgeTask`]s: one transform per
//! input, plus a concat task when there is more than one input. The
//! [`TaskGraph`] records which task consumes which output.

pub mod compose;
pub mod graph;

pub use compose::{Composition, Source, compose, compose_into};
pub use graph::TaskGraph;

use crate::media::{FrameRate, Resolution};
use crate::operation::LogLevel;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Identifier of a task within one [`TaskGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Values resolved for a single transform task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformParams {
    /// Input seek offset in seconds (`-ss`)
    pub trim_start: Option<f64>,
    /// Output duration in seconds (`-t`)
    pub output_duration: Option<f64>,
    /// Presentation timestamp factor (`setpts=<f>*PTS`)
    pub time_scale: Option<f64>,
    pub resolution: Option<Resolution>,
    pub frame_rate: Option<FrameRate>,
    pub audio: bool,
}

/// What a task does with its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskAction {
    /// Re-encode one input with the given parameters.
    Transform {
        input: PathBuf,
        params: TransformParams,
    },
    /// Join already uniform clips without re-encoding.
    Concat { inputs: Vec<PathBuf> },
}

/// One unit of ffmpeg work producing exactly one output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForgeTask {
    pub id: TaskId,
    pub name: String,
    pub action: TaskAction,
    pub output: PathBuf,
    pub log_level: LogLevel,
}

impl ForgeTask {
    /// Files read by this task.
    #[must_use]
    pub fn inputs(&self) -> Vec<&PathBuf> {
        match &self.action {
            TaskAction::Transform { input, .. } => vec![input],
            TaskAction::Concat { inputs } => inputs.iter().collect(),
        }
    }

    #[must_use]
    pub fn is_concat(&self) -> bool {
        matches!(self.action, TaskAction::Concat { .. })
    }
}
