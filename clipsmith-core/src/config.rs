//! Configuration constants and encoder settings for clipsmith-core.
//!
//! Defaults live here as constants; the encoder settings can be overridden
//! through environment variables so that the CLI surface stays focused on the
//! clip operations themselves.

use std::path::PathBuf;

// Default constants

/// Name of the per-folder metadata cache file.
pub const CACHE_FILENAME: &str = ".clipsmith_cache.yaml";

/// Schema version written to and expected from cache files.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// File extensions (lowercase, without the dot) recognized as videos.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "mkv", "avi", "webm"];

/// Extension used for intermediate clips when the output has none.
pub const DEFAULT_INTERMEDIATE_EXTENSION: &str = "mp4";

/// Default ffmpeg video encoder.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// Default encoder preset (x264 naming).
pub const DEFAULT_ENCODER_PRESET: &str = "medium";

/// Default constant rate factor. Lower values mean higher quality.
pub const DEFAULT_CRF: u8 = 20;

/// Number of trailing ffmpeg log lines kept for error reports.
pub const STDERR_TAIL_LINES: usize = 20;

/// Prefix of the scratch directory holding intermediate clips.
pub const SCRATCH_DIR_PREFIX: &str = ".clipsmith_scratch_";

/// Environment variable overriding the ffmpeg binary.
pub const ENV_FFMPEG: &str = "CLIPSMITH_FFMPEG";
/// Environment variable overriding the video encoder.
pub const ENV_VIDEO_CODEC: &str = "CLIPSMITH_VIDEO_CODEC";
/// Environment variable overriding the encoder preset.
pub const ENV_PRESET: &str = "CLIPSMITH_PRESET";
/// Environment variable overriding the CRF value.
pub const ENV_CRF: &str = "CLIPSMITH_CRF";
/// Default number of concurrent ffmpeg processes
pub const ENV_JOBS: &str = "CLIPSMITH_JOBS";

/// Video encoder settings used by every transform task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_ENCODER_PRESET.to_string(),
            crf: DEFAULT_CRF,
        }
    }
}

impl EncoderSettings {
    /// Reads the settings from the environment, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            video_codec: get_env_string(ENV_VIDEO_CODEC, DEFAULT_VIDEO_CODEC.to_string()),
            preset: get_env_string(ENV_PRESET, DEFAULT_ENCODER_PRESET.to_string()),
            crf: get_env_u8(ENV_CRF, DEFAULT_CRF),
        }
    }
}

/// Get a string value from an environment variable or use the default
pub fn get_env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

/// Get a path value from an environment variable, if set and non-empty
pub fn get_env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Get a u8 value from an environment variable or use the default
pub fn get_env_u8(key: &str, default: u8) -> u8 {
    match std::env::var(key) {
        Ok(val) => val.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Get a usize value from an environment variable or use the default
pub fn get_env_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Number of worker threads used when the caller does not choose one:
/// `CLIPSMITH_JOBS` if set, else the available parallelism.
#[must_use]
pub fn default_jobs() -> usize {
    let available = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    get_env_usize(ENV_JOBS, available).max(1)
}
