// ============================================================================
// clipsmith-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg process management and task execution
//
// KEY COMPONENTS:
// - FfmpegProcess / FfmpegSpawner: traits over a running ffmpeg child
// - SidecarSpawner: concrete implementation using ffmpeg-sidecar
// - TaskExecutor: runs one ForgeTask to completion
// - TranscodeInvoker: TaskExecutor that drives ffmpeg through a spawner

use super::ffmpeg_builder::{concat_args, concat_list, transform_args};
use super::ffmpeg_path;
use crate::config::{EncoderSettings, STDERR_TAIL_LINES};
use crate::error::{
    CoreError, CoreResult, command_start_error, command_wait_error, transcode_failed_error,
};
use crate::tasks::{ForgeTask, TaskAction};
use crate::temp_files;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
///
/// Spawners are shared between worker threads, hence `Sync`.
pub trait FfmpegSpawner: Sync {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_start_error("ffmpeg", io::Error::other(e.to_string()))
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

// --- Task execution ---

/// Runs a single forge task and returns the path it wrote.
pub trait TaskExecutor: Sync {
    fn execute(&self, task: &ForgeTask) -> CoreResult<PathBuf>;
}

/// Executes forge tasks by invoking ffmpeg.
#[derive(Debug, Clone)]
pub struct TranscodeInvoker<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
    settings: EncoderSettings,
}

impl TranscodeInvoker<SidecarSpawner> {
    /// Invoker running the real ffmpeg with settings from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(SidecarSpawner, EncoderSettings::from_env())
    }
}

impl<S: FfmpegSpawner> TranscodeInvoker<S> {
    #[must_use]
    pub fn new(spawner: S, settings: EncoderSettings) -> Self {
        Self { spawner, settings }
    }

    #[must_use]
    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    #[must_use]
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    fn run_ffmpeg(&self, task: &ForgeTask, args: &[String]) -> CoreResult<()> {
        let mut cmd = FfmpegCommand::new_with_path(ffmpeg_path());
        cmd.args(args);
        log::debug!("Running ffmpeg for '{}': {}", task.name, args.join(" "));

        let mut process = self.spawner.spawn(cmd)?;
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        process.handle_events(|event| {
            match event {
                FfmpegEvent::Log(_, line) | FfmpegEvent::Error(line) => {
                    log::trace!("[{}] {}", task.name, line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                FfmpegEvent::Progress(progress) => {
                    log::debug!(
                        "[{}] frame={} time={} speed={:.2}x",
                        task.name,
                        progress.frame,
                        progress.time,
                        progress.speed
                    );
                }
                _ => {}
            }
            Ok(())
        })?;

        let status = process.wait()?;
        if !status.success() {
            log::error!("ffmpeg failed for '{}': {}", task.name, status);
            let tail: Vec<String> = tail.into_iter().collect();
            return Err(transcode_failed_error(&task.name, status, tail.join("\n")));
        }
        Ok(())
    }

    fn execute_concat(&self, task: &ForgeTask, inputs: &[PathBuf]) -> CoreResult<()> {
        let list_dir = inputs
            .first()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let list_file = temp_files::create_temp_file_path(list_dir, "concat", "txt");
        std::fs::write(&list_file, concat_list(inputs))?;

        let args = concat_args(&list_file, &task.output, task.log_level);
        let result = self.run_ffmpeg(task, &args);

        if let Err(e) = std::fs::remove_file(&list_file) {
            log::warn!("Could not remove concat list {}: {}", list_file.display(), e);
        }
        result
    }
}

impl<S: FfmpegSpawner> TaskExecutor for TranscodeInvoker<S> {
    fn execute(&self, task: &ForgeTask) -> CoreResult<PathBuf> {
        if let Some(parent) = task.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match &task.action {
            TaskAction::Transform { input, params } => {
                let args = transform_args(input, params, &task.output, task.log_level, &self.settings);
                self.run_ffmpeg(task, &args)?;
            }
            TaskAction::Concat { inputs } => {
                if inputs.is_empty() {
                    return Err(CoreError::TaskGraph(format!(
                        "concat task '{}' has no inputs",
                        task.name
                    )));
                }
                self.execute_concat(task, inputs)?;
            }
        }

        log::info!("Finished '{}': {}", task.name, task.output.display());
        Ok(task.output.clone())
    }
}
