// ============================================================================
// clipsmith-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// All media work is delegated to ffmpeg; metadata comes from ffprobe. Both are
// reached through traits (FfmpegSpawner, MetadataProber) so that tests can
// substitute fakes for the real binaries.

use crate::config::{ENV_FFMPEG, get_env_path};
use crate::error::{CoreError, CoreResult};

use once_cell::sync::Lazy;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Argument construction for transform and concat tasks
pub mod ffmpeg_builder;

/// Spawning ffmpeg and running forge tasks
pub mod ffmpeg_executor;

/// Probing video metadata through ffprobe
pub mod ffprobe_executor;

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, TaskExecutor, TranscodeInvoker,
};
pub use ffprobe_executor::{FfprobeProber, MetadataProber, ProbeOutcome};

static FFMPEG_PATH: Lazy<PathBuf> =
    Lazy::new(|| get_env_path(ENV_FFMPEG).unwrap_or_else(|| PathBuf::from("ffmpeg")));

/// The ffmpeg binary to run: `CLIPSMITH_FFMPEG` if set, else `ffmpeg` from PATH.
#[must_use]
pub fn ffmpeg_path() -> &'static Path {
    FFMPEG_PATH.as_path()
}

/// Checks if a required external command is available and executable.
///
/// Runs the command with `-version` and discards its output.
///
/// # Errors
///
/// `DependencyNotFound` if the binary does not exist, `CommandStart` if it
/// exists but cannot be started.
pub fn check_dependency(cmd: &Path) -> CoreResult<()> {
    let result = Command::new(cmd)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CoreError::DependencyNotFound(cmd.display().to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd.display(), e);
            Err(CoreError::CommandStart(cmd.display().to_string(), e))
        }
    }
}

/// Checks that both ffmpeg and ffprobe can be run.
pub fn check_dependencies() -> CoreResult<()> {
    check_dependency(ffmpeg_path())?;
    check_dependency(Path::new("ffprobe"))
}
