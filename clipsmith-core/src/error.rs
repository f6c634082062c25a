// ============================================================================
// clipsmith-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the clipsmith-core library
//
// Every fallible operation in the library returns `CoreResult<T>`. Validation
// errors (options and inputs) are raised before any task runs; transcode
// errors carry the failing task and the tail of ffmpeg's log output.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by clipsmith-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ---- Input resolution ----
    #[error("Input path not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Input '{}' is not a recognized video file", .0.display())]
    InvalidInputKind(PathBuf),

    #[error("No valid video inputs were found")]
    EmptyInputSet,

    #[error("Failed to probe '{}': {reason}", path.display())]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("Missing {field} for '{}'; it is required by the requested operation", path.display())]
    MissingMetadata { path: PathBuf, field: &'static str },

    // ---- Option validation ----
    #[error("Options --{0} and --{1} cannot be combined")]
    ConflictingOptions(&'static str, &'static str),

    #[error("Unsupported combination of options: {0}")]
    UnsupportedCombination(&'static str),

    #[error("Invalid format for --{option}: '{value}' (expected {expected})")]
    InvalidFormat {
        option: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid value for --{option}: '{value}' ({reason})")]
    InvalidValue {
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid range for --{option}: start {start} must be before end {end}")]
    InvalidRange {
        option: &'static str,
        start: f64,
        end: f64,
    },

    // ---- Task composition and execution ----
    #[error("No output tasks could be composed: the input set is empty")]
    NoOutputTasks,

    #[error("Invalid task graph: {0}")]
    TaskGraph(String),

    #[error(
        "Task '{task}' failed: ffmpeg exited with {}\n{stderr_tail}",
        exit_code.map_or_else(|| "no exit code".to_string(), |c| format!("code {c}"))
    )]
    TranscodeFailed {
        task: String,
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    // ---- External tools ----
    #[error("Required dependency '{0}' not found on PATH")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, std::io::Error),

    #[error("Failed waiting for '{0}': {1}")]
    CommandWait(String, std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for clipsmith-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error for a tool that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a `CommandWait` error for a child process that could not be awaited.
pub fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds a `TranscodeFailed` error from an exit status and collected log lines.
pub fn transcode_failed_error(
    task: impl Into<String>,
    status: ExitStatus,
    stderr_tail: impl Into<String>,
) -> CoreError {
    CoreError::TranscodeFailed {
        task: task.into(),
        exit_code: status.code(),
        stderr_tail: stderr_tail.into(),
    }
}

impl CoreError {
    /// Whether this error was raised while checking options or inputs,
    /// i.e. before any task could have produced output.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::InputNotFound(_)
                | CoreError::InvalidInputKind(_)
                | CoreError::EmptyInputSet
                | CoreError::ConflictingOptions(..)
                | CoreError::UnsupportedCombination(_)
                | CoreError::InvalidFormat { .. }
                | CoreError::InvalidValue { .. }
                | CoreError::InvalidRange { .. }
                | CoreError::NoOutputTasks
        )
    }
}
