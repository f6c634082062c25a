//! Forge context: collects the tasks of one or more clips, then runs them.
//!
//! ```rust,no_run
//! use clipsmith_core::{ForgeContext, InputSet, TaskRunner, TranscodeInvoker, TransformRequest};
//! # fn demo(inputs: InputSet) -> clipsmith_core::CoreResult<()> {
//! let mut ctx = ForgeContext::new(std::path::Path::new("/videos"))?;
//! let request = TransformRequest::builder().dur_scale(Some(0.25)).build()?;
//! let fast = ctx.forge("/videos/fast.mp4", &inputs, &request)?;
//! let small = TransformRequest::builder().res_scale(Some(0.5)).build()?;
//! ctx.reforge(&fast, "/videos/fast_small.mp4", &small)?;
//! let report = ctx.run(&TaskRunner::new(2), &TranscodeInvoker::from_env(), |_, _| {})?;
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```

use crate::error::CoreResult;
use crate::external::TaskExecutor;
use crate::media::{InputSet, InputVideo};
use crate::operation::TransformRequest;
use crate::runner::{RunReport, TaskOutcome, TaskRunner};
use crate::tasks::{ForgeTask, Source, TaskGraph, TaskId, compose_into};
use crate::temp_files::create_scratch_dir;

use log::{info, warn};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A clip that will exist once its final task has run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// The clip as an input video, with metadata derived from the plan
    pub video: InputVideo,
    /// Task writing the clip
    pub task: TaskId,
}

impl Clip {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.video.path
    }
}

pub struct ForgeContext {
    graph: TaskGraph,
    scratch: Option<TempDir>,
    scratch_path: PathBuf,
}

impl ForgeContext {
    /// Creates a context whose scratch directory lives under `scratch_parent`.
    pub fn new(scratch_parent: &Path) -> CoreResult<Self> {
        let scratch = create_scratch_dir(scratch_parent)?;
        let scratch_path = scratch.path().to_path_buf();
        Ok(Self {
            graph: TaskGraph::new(),
            scratch: Some(scratch),
            scratch_path,
        })
    }

    #[must_use]
    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_path
    }

    /// Leaves the scratch directory and its intermediates on disk.
    pub fn keep_scratch(&mut self) -> &Path {
        if let Some(scratch) = self.scratch.take() {
            #[allow(deprecated)]
            let kept = scratch.into_path();
            info!("Keeping intermediate files in {}", kept.display());
        }
        &self.scratch_path
    }

    /// Adds the tasks producing `output` from `inputs`.
    pub fn forge(
        &mut self,
        output: impl Into<PathBuf>,
        inputs: &InputSet,
        request: &TransformRequest,
    ) -> CoreResult<Clip> {
        let sources: Vec<Source> = inputs.videos().iter().cloned().map(Source::file).collect();
        self.add_clip(output.into(), &sources, request)
    }

    /// Adds tasks producing `output` from an earlier clip of this context.
    pub fn reforge(
        &mut self,
        clip: &Clip,
        output: impl Into<PathBuf>,
        request: &TransformRequest,
    ) -> CoreResult<Clip> {
        let source = Source::produced_by(clip.video.clone(), clip.task);
        self.add_clip(output.into(), &[source], request)
    }

    fn add_clip(
        &mut self,
        output: PathBuf,
        sources: &[Source],
        request: &TransformRequest,
    ) -> CoreResult<Clip> {
        let composition = compose_into(&mut self.graph, sources, request, &output, &self.scratch_path)?;
        Ok(Clip {
            video: InputVideo::new(output, composition.metadata),
            task: composition.final_task,
        })
    }

    /// Runs every task added so far.
    ///
    /// When any task fails the scratch directory is kept, so intermediates
    /// of tasks that did succeed survive the context.
    pub fn run<E, F>(
        &mut self,
        runner: &TaskRunner,
        executor: &E,
        on_finish: F,
    ) -> CoreResult<RunReport>
    where
        E: TaskExecutor + ?Sized,
        F: Fn(&ForgeTask, &TaskOutcome) + Sync,
    {
        info!(
            "Running {} task(s) with {} job(s)",
            self.graph.len(),
            runner.jobs()
        );
        let report = runner.run(&self.graph, executor, on_finish)?;
        if !report.is_success() && self.scratch.is_some() {
            warn!("{} task(s) failed", report.failed());
            self.keep_scratch();
        }
        Ok(report)
    }
}
