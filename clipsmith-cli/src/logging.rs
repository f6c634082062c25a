// ============================================================================
// clipsmith-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Helper Functions for Logging
//
// Logger initialization itself lives in clipsmith-core (`logging::setup_logging`,
// log4rs based). This module only decides where log files go.

use crate::error::{CliErrorContext, CliResult};

use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let name = format!("clipsmith_forge_{}.log", clipsmith_cli::logging::get_timestamp());
/// assert_eq!(name.len(), "clipsmith_forge_20240601_123045.log".len());
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Creates `log_dir` if needed and returns the path of a fresh log file for `command`.
pub fn prepare_log_file(log_dir: &Path, command: &str) -> CliResult<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .cli_with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    Ok(log_dir.join(format!("clipsmith_{}_{}.log", command, get_timestamp())))
}
