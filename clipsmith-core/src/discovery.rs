//! Input resolution: turns command-line paths into an ordered set of videos.
//!
//! Files are taken as given and probed directly. Folders are scanned for
//! non-hidden video files in lexicographic order, followed (when recursive)
//! by their subfolders, depth first. Each folder may keep its own metadata
//! cache so unchanged files are not probed again.

use crate::cache::{FileStamp, MetadataCache};
use crate::error::{CoreError, CoreResult};
use crate::external::MetadataProber;
use crate::media::{InputSet, InputVideo};
use crate::operation::TransformRequest;
use crate::utils::{has_video_extension, is_hidden};

use log::{debug, info};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Options steering how folders are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Read and write per-folder metadata caches
    pub cache: bool,
    /// Descend into subfolders
    pub recursive: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            cache: false,
            recursive: true,
        }
    }
}

impl From<&TransformRequest> for ResolveOptions {
    fn from(request: &TransformRequest) -> Self {
        Self {
            cache: request.cache(),
            recursive: request.recursive(),
        }
    }
}

#[derive(Debug, Default)]
struct Scan {
    videos: Vec<InputVideo>,
    invalid: usize,
}

/// Resolves `paths` into the videos to process, in argument order.
///
/// # Errors
///
/// - `InputNotFound` if a path does not exist
/// - `InvalidInputKind` if a file is not a recognized video
/// - `ProbeFailed` if an explicitly named file cannot be probed
/// - `EmptyInputSet` if nothing valid remains
pub fn resolve_inputs<P: MetadataProber + ?Sized>(
    paths: &[PathBuf],
    options: ResolveOptions,
    prober: &P,
) -> CoreResult<InputSet> {
    let mut scan = Scan::default();

    for path in paths {
        if !path.exists() {
            return Err(CoreError::InputNotFound(path.clone()));
        }
        if path.is_dir() {
            scan_folder(path, options, prober, &mut scan)?;
        } else if path.is_file() && has_video_extension(path) {
            let outcome = prober.probe(path);
            if !outcome.metadata.valid {
                return Err(CoreError::ProbeFailed {
                    path: path.clone(),
                    reason: outcome
                        .reason
                        .unwrap_or_else(|| "not a valid video".to_string()),
                });
            }
            scan.videos.push(InputVideo::new(path.clone(), outcome.metadata));
        } else {
            return Err(CoreError::InvalidInputKind(path.clone()));
        }
    }

    info!(
        "Found inputs: {} valid, {} invalid",
        scan.videos.len(),
        scan.invalid
    );

    if scan.videos.is_empty() {
        return Err(CoreError::EmptyInputSet);
    }
    Ok(InputSet::new(scan.videos))
}

fn scan_folder<P: MetadataProber + ?Sized>(
    folder: &Path,
    options: ResolveOptions,
    prober: &P,
    scan: &mut Scan,
) -> CoreResult<()> {
    let mut files = Vec::new();
    let mut subfolders = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        // Symlinked folders are not followed, to keep traversal finite.
        if entry.file_type()?.is_dir() {
            subfolders.push(path);
        } else if path.is_file() && has_video_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    subfolders.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(
        "Scanning {}: {} video file(s), {} subfolder(s)",
        folder.display(),
        files.len(),
        subfolders.len()
    );

    let mut cache = options.cache.then(|| MetadataCache::load(folder));
    let mut present = BTreeSet::new();

    for path in files {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let metadata = match cache.as_mut() {
            Some(cache) => {
                let stamp = FileStamp::of(&path)?;
                present.insert(filename.clone());
                match cache.lookup(&filename, stamp) {
                    Some(metadata) => metadata,
                    None => {
                        let metadata = prober.probe(&path).metadata;
                        cache.update(&filename, stamp, &metadata);
                        metadata
                    }
                }
            }
            None => prober.probe(&path).metadata,
        };

        if metadata.valid {
            scan.videos.push(InputVideo::new(path, metadata));
        } else {
            info!("Skipping invalid video: {}", path.display());
            scan.invalid += 1;
        }
    }

    if let Some(cache) = cache.as_mut() {
        cache.retain(&present);
        if cache.save_if_changed()? {
            debug!("Updated cache {}", cache.path().display());
        }
    }

    if options.recursive {
        for subfolder in subfolders {
            scan_folder(&subfolder, options, prober, scan)?;
        }
    }
    Ok(())
}
