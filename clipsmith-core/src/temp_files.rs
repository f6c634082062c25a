//! Temporary file management utilities.
//!
//! Intermediate clips live in a scratch directory created with the tempfile
//! crate, so they are removed when the `TempDir` is dropped, including on
//! error paths.

use crate::config::SCRATCH_DIR_PREFIX;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Creates the scratch directory under `parent`. Auto-cleaned when dropped.
pub fn create_scratch_dir(parent: &Path) -> CoreResult<TempDir> {
    std::fs::create_dir_all(parent)?;

    Ok(TempFileBuilder::new()
        .prefix(SCRATCH_DIR_PREFIX)
        .tempdir_in(parent)?)
}

/// Returns a temporary file path with random suffix. Does not create the file.
pub fn create_temp_file_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    use rand::distributions::Alphanumeric;
    use rand::{Rng, thread_rng};

    let random_suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();

    let filename = format!("{prefix}_{random_suffix}.{extension}");
    dir.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir_is_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = create_scratch_dir(parent.path()).unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.is_dir());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(SCRATCH_DIR_PREFIX)
        );
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_file_path_shape() {
        let path = create_temp_file_path(Path::new("/tmp"), "concat", "txt");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("concat_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "concat_".len() + 6 + ".txt".len());
        assert!(!path.exists());
    }
}
