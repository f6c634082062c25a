// clipsmith-core/tests/discovery_tests.rs

use clipsmith_core::config::CACHE_FILENAME;
use clipsmith_core::error::CoreError;
use clipsmith_core::{
    FrameRate, MetadataProber, ProbeOutcome, Resolution, ResolveOptions, VideoMetadata,
    resolve_inputs,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::tempdir;

/// Treats files whose name contains "broken" as unreadable and records every probe.
#[derive(Default)]
struct FakeProber {
    probed: Mutex<Vec<PathBuf>>,
}

impl FakeProber {
    fn probe_count(&self) -> usize {
        self.probed.lock().unwrap().len()
    }
}

impl MetadataProber for FakeProber {
    fn probe(&self, path: &Path) -> ProbeOutcome {
        self.probed.lock().unwrap().push(path.to_path_buf());
        if path.to_string_lossy().contains("broken") {
            return ProbeOutcome::invalid("moov atom not found");
        }
        ProbeOutcome::valid(VideoMetadata {
            duration: Some(10.0),
            resolution: Some(Resolution::new(1920, 1080)),
            codec: Some("h264".to_string()),
            frame_rate: Some(FrameRate { num: 30, den: 1 }),
            has_audio: Some(true),
            valid: true,
        })
    }
}

fn names(set: &clipsmith_core::InputSet) -> Vec<String> {
    set.paths()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_folder_is_sorted_filtered_and_recursive() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path();

    File::create(root.join("b.mp4"))?;
    File::create(root.join("a.MOV"))?;
    File::create(root.join("notes.txt"))?;
    File::create(root.join(".hidden.mp4"))?;
    File::create(root.join("c_broken.mp4"))?;
    fs::create_dir(root.join("z_sub"))?;
    File::create(root.join("z_sub").join("d.mkv"))?;
    fs::create_dir(root.join("a_sub"))?;
    File::create(root.join("a_sub").join("e.mp4"))?;
    fs::create_dir(root.join(".git"))?;
    File::create(root.join(".git").join("f.mp4"))?;

    let prober = FakeProber::default();
    let set = resolve_inputs(&[root.to_path_buf()], ResolveOptions::default(), &prober)?;

    assert_eq!(names(&set), vec!["a.MOV", "b.mp4", "e.mp4", "d.mkv"]);
    assert_eq!(prober.probe_count(), 5);
    assert!(!root.join(CACHE_FILENAME).exists());
    Ok(())
}

#[test]
fn test_non_recursive_stays_in_folder() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("a.mp4"))?;
    fs::create_dir(dir.path().join("sub"))?;
    File::create(dir.path().join("sub").join("b.mp4"))?;

    let options = ResolveOptions {
        cache: false,
        recursive: false,
    };
    let set = resolve_inputs(&[dir.path().to_path_buf()], options, &FakeProber::default())?;
    assert_eq!(names(&set), vec!["a.mp4"]);
    Ok(())
}

#[test]
fn test_cached_resolution_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("a.mp4"))?;
    File::create(dir.path().join("b.mp4"))?;
    fs::create_dir(dir.path().join("sub"))?;
    File::create(dir.path().join("sub").join("c.mp4"))?;

    let options = ResolveOptions {
        cache: true,
        recursive: true,
    };
    let paths = [dir.path().to_path_buf()];

    let first_prober = FakeProber::default();
    let first = resolve_inputs(&paths, options, &first_prober)?;
    assert_eq!(first_prober.probe_count(), 3);

    let cache_file = dir.path().join(CACHE_FILENAME);
    let sub_cache_file = dir.path().join("sub").join(CACHE_FILENAME);
    assert!(cache_file.is_file());
    assert!(sub_cache_file.is_file());
    let written = fs::read_to_string(&cache_file)?;
    let written_at = fs::metadata(&cache_file)?.modified()?;

    let second_prober = FakeProber::default();
    let second = resolve_inputs(&paths, options, &second_prober)?;

    assert_eq!(first, second);
    assert_eq!(second_prober.probe_count(), 0);
    assert_eq!(fs::read_to_string(&cache_file)?, written);
    assert_eq!(fs::metadata(&cache_file)?.modified()?, written_at);
    Ok(())
}

#[test]
fn test_changed_file_is_probed_again() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("a.mp4"))?;
    File::create(dir.path().join("b.mp4"))?;
    let options = ResolveOptions {
        cache: true,
        recursive: true,
    };
    let paths = [dir.path().to_path_buf()];
    resolve_inputs(&paths, options, &FakeProber::default())?;

    fs::write(dir.path().join("b.mp4"), b"grown")?;
    fs::remove_file(dir.path().join("a.mp4"))?;

    let prober = FakeProber::default();
    let set = resolve_inputs(&paths, options, &prober)?;
    assert_eq!(names(&set), vec!["b.mp4"]);
    assert_eq!(prober.probe_count(), 1);

    let cache = fs::read_to_string(dir.path().join(CACHE_FILENAME))?;
    assert!(!cache.contains("a.mp4"));
    assert!(cache.contains("b.mp4"));
    Ok(())
}

#[test]
fn test_missing_input() {
    let err = resolve_inputs(
        &[PathBuf::from("surely_this_does_not_exist_42.mp4")],
        ResolveOptions::default(),
        &FakeProber::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::InputNotFound(_)));
}

#[test]
fn test_explicit_file_checks() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let text = dir.path().join("notes.txt");
    let broken = dir.path().join("broken.mp4");
    File::create(&text)?;
    File::create(&broken)?;

    let err = resolve_inputs(&[text], ResolveOptions::default(), &FakeProber::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInputKind(_)));

    let err = resolve_inputs(&[broken], ResolveOptions::default(), &FakeProber::default())
        .unwrap_err();
    match err {
        CoreError::ProbeFailed { reason, .. } => assert_eq!(reason, "moov atom not found"),
        other => panic!("Unexpected error type: {:?}", other),
    }
    Ok(())
}

#[test]
fn test_folder_without_valid_videos() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("document.txt"))?;
    File::create(dir.path().join("broken.mp4"))?;

    let err = resolve_inputs(
        &[dir.path().to_path_buf()],
        ResolveOptions::default(),
        &FakeProber::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::EmptyInputSet));
    Ok(())
}

#[test]
fn test_files_and_folders_keep_argument_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("clips"))?;
    File::create(dir.path().join("clips").join("b.mp4"))?;
    File::create(dir.path().join("a.mp4"))?;
    File::create(dir.path().join("z.mp4"))?;

    let set = resolve_inputs(
        &[
            dir.path().join("z.mp4"),
            dir.path().join("clips"),
            dir.path().join("a.mp4"),
        ],
        ResolveOptions::default(),
        &FakeProber::default(),
    )?;
    assert_eq!(names(&set), vec!["z.mp4", "b.mp4", "a.mp4"]);
    Ok(())
}
