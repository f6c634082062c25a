//! Turns a validated request and a set of inputs into forge tasks.
//!
//! A single input becomes one transform writing straight to the output.
//! Several inputs are first normalized into the scratch directory (same
//! frame size and frame rate, so the concat demuxer can join them without
//! re-encoding) and then concatenated.

use super::{TaskAction, TaskGraph, TaskId, TransformParams};
use crate::config::DEFAULT_INTERMEDIATE_EXTENSION;
use crate::error::{CoreError, CoreResult};
use crate::media::{FrameRate, InputSet, InputVideo, Resolution, VideoMetadata};
use crate::operation::{DurationChange, ResolutionChange, TransformRequest};

use log::{debug, warn};
use std::path::{Path, PathBuf};

/// An input to composition, optionally produced by an earlier task.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub video: InputVideo,
    pub producer: Option<TaskId>,
}

impl Source {
    /// An input that already exists on disk.
    #[must_use]
    pub fn file(video: InputVideo) -> Self {
        Self {
            video,
            producer: None,
        }
    }

    /// An input that will be written by `producer`.
    #[must_use]
    pub fn produced_by(video: InputVideo, producer: TaskId) -> Self {
        Self {
            video,
            producer: Some(producer),
        }
    }
}

/// Result of composing one output.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// The task writing the requested output
    pub final_task: TaskId,
    /// Metadata the output is expected to have once written
    pub metadata: VideoMetadata,
}

/// Builds a fresh task graph producing `output` from `inputs`.
///
/// # Errors
///
/// `NoOutputTasks` for an empty input set, `InvalidRange` when the trim start
/// lies beyond an input, `MissingMetadata` when a required attribute is
/// unknown.
pub fn compose(
    inputs: &InputSet,
    request: &TransformRequest,
    output: &Path,
    scratch_dir: &Path,
) -> CoreResult<TaskGraph> {
    let sources: Vec<Source> = inputs.videos().iter().cloned().map(Source::file).collect();
    let mut graph = TaskGraph::new();
    compose_into(&mut graph, &sources, request, output, scratch_dir)?;
    Ok(graph)
}

/// Adds the tasks producing `output` from `sources` to an existing graph.
pub fn compose_into(
    graph: &mut TaskGraph,
    sources: &[Source],
    request: &TransformRequest,
    output: &Path,
    scratch_dir: &Path,
) -> CoreResult<Composition> {
    let first = sources.first().ok_or(CoreError::NoOutputTasks)?;
    let multiple = sources.len() > 1;

    let effective: Vec<Option<f64>> = sources
        .iter()
        .map(|source| effective_duration(&source.video, request))
        .collect::<CoreResult<_>>()?;
    let time_scale = resolve_time_scale(sources, &effective, request)?;
    let resolution = resolve_resolution(&first.video, multiple, request)?;
    let frame_rate = if multiple {
        first.video.metadata.frame_rate
    } else {
        None
    };
    let audio = resolve_audio(sources, multiple, request);

    let params: Vec<TransformParams> = effective
        .iter()
        .map(|eff| TransformParams {
            trim_start: request.trim_start(),
            output_duration: request
                .trim_end()
                .and(*eff)
                .map(|e| e * time_scale.unwrap_or(1.0)),
            time_scale,
            resolution,
            frame_rate,
            audio,
        })
        .collect();

    let metadata = derive_metadata(
        sources,
        &effective,
        time_scale,
        resolution,
        frame_rate,
        audio,
    );

    let final_task = if multiple {
        let extension = output_extension(output);
        let mut normalized = Vec::with_capacity(sources.len());
        let mut normalize_tasks = Vec::with_capacity(sources.len());

        for (source, params) in sources.iter().zip(params) {
            let stem = source
                .video
                .path
                .file_stem()
                .map_or_else(|| "input".into(), |s| s.to_string_lossy());
            // Numbered by the id the task is about to get, unique within the graph.
            let intermediate =
                scratch_dir.join(format!("{stem}_norm_{}.{extension}", graph.len()));
            let id = graph.add_task(
                format!("normalize {}", display_name(&source.video.path)),
                TaskAction::Transform {
                    input: source.video.path.clone(),
                    params,
                },
                intermediate.clone(),
                request.log_level(),
                &source.producer.into_iter().collect::<Vec<_>>(),
            )?;
            normalized.push(intermediate);
            normalize_tasks.push(id);
        }

        graph.add_task(
            "concat",
            TaskAction::Concat { inputs: normalized },
            output.to_path_buf(),
            request.log_level(),
            &normalize_tasks,
        )?
    } else {
        let params = params.into_iter().next().unwrap_or_default();
        graph.add_task(
            format!("transform {}", display_name(&first.video.path)),
            TaskAction::Transform {
                input: first.video.path.clone(),
                params,
            },
            output.to_path_buf(),
            request.log_level(),
            &first.producer.into_iter().collect::<Vec<_>>(),
        )?
    };

    debug!(
        "Composed {} task(s) for {}",
        if multiple { sources.len() + 1 } else { 1 },
        output.display()
    );

    Ok(Composition {
        final_task,
        metadata,
    })
}

/// Seconds of `video` kept after trimming; None if that cannot be known.
fn effective_duration(video: &InputVideo, request: &TransformRequest) -> CoreResult<Option<f64>> {
    let start = request.trim_start().unwrap_or(0.0);
    let duration = video.metadata.duration;

    if let (Some(trim_start), Some(duration)) = (request.trim_start(), duration) {
        if trim_start >= duration {
            return Err(CoreError::InvalidRange {
                option: "trim-start",
                start: trim_start,
                end: duration,
            });
        }
    }

    let end = match (request.trim_end(), duration) {
        (Some(end), Some(duration)) => Some(end.min(duration)),
        (Some(end), None) => Some(end),
        (None, duration) => duration,
    };
    Ok(end.map(|end| end - start))
}

fn resolve_time_scale(
    sources: &[Source],
    effective: &[Option<f64>],
    request: &TransformRequest,
) -> CoreResult<Option<f64>> {
    match request.duration() {
        None => Ok(None),
        Some(DurationChange::Scale(factor)) => Ok(Some(factor)),
        Some(DurationChange::Target(target)) => {
            let mut total = 0.0;
            for (source, eff) in sources.iter().zip(effective) {
                total += eff.ok_or_else(|| CoreError::MissingMetadata {
                    path: source.video.path.clone(),
                    field: "duration",
                })?;
            }
            Ok(Some(target / total))
        }
    }
}

/// Whether the transforms keep audio.
///
/// The concat demuxer needs the same streams in every part, so audio is
/// dropped everywhere as soon as one of several inputs is known to have none.
fn resolve_audio(sources: &[Source], multiple: bool, request: &TransformRequest) -> bool {
    if !request.audio() {
        return false;
    }
    if !multiple {
        return true;
    }
    let silent: Vec<String> = sources
        .iter()
        .filter(|s| s.video.metadata.has_audio == Some(false))
        .map(|s| display_name(&s.video.path))
        .collect();
    if silent.is_empty() {
        return true;
    }
    warn!(
        "Dropping audio from every clip: {} without an audio stream",
        silent.join(", ")
    );
    false
}

fn resolve_resolution(
    first: &InputVideo,
    multiple: bool,
    request: &TransformRequest,
) -> CoreResult<Option<Resolution>> {
    let source_resolution = || {
        first
            .metadata
            .resolution
            .ok_or_else(|| CoreError::MissingMetadata {
                path: first.path.clone(),
                field: "resolution",
            })
    };

    match request.resolution() {
        Some(ResolutionChange::Target(target)) => Ok(Some(target)),
        Some(ResolutionChange::Scale(factor)) => Ok(Some(source_resolution()?.scaled(factor))),
        None if multiple => Ok(Some(source_resolution()?)),
        None => Ok(None),
    }
}

fn derive_metadata(
    sources: &[Source],
    effective: &[Option<f64>],
    time_scale: Option<f64>,
    resolution: Option<Resolution>,
    frame_rate: Option<FrameRate>,
    audio: bool,
) -> VideoMetadata {
    let first = sources.first().map(|s| &s.video.metadata);
    let duration = effective
        .iter()
        .map(|eff| eff.map(|e| e * time_scale.unwrap_or(1.0)))
        .sum();

    VideoMetadata {
        duration,
        resolution: resolution.or_else(|| first.and_then(|m| m.resolution)),
        codec: None,
        frame_rate: frame_rate.or_else(|| first.and_then(|m| m.frame_rate)),
        has_audio: if audio {
            first.and_then(|m| m.has_audio)
        } else {
            Some(false)
        },
        valid: true,
    }
}

fn output_extension(output: &Path) -> String {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_INTERMEDIATE_EXTENSION)
        .to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Paths of the intermediate files a composition writes into `scratch_dir`.
#[must_use]
pub fn intermediate_outputs(graph: &TaskGraph, scratch_dir: &Path) -> Vec<PathBuf> {
    graph
        .tasks()
        .iter()
        .filter(|task| task.output.starts_with(scratch_dir))
        .map(|task| task.output.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(path: &str, duration: f64) -> InputVideo {
        InputVideo::new(
            path,
            VideoMetadata {
                duration: Some(duration),
                resolution: Some(Resolution::new(1920, 1080)),
                codec: Some("h264".to_string()),
                frame_rate: Some(FrameRate { num: 30, den: 1 }),
                has_audio: Some(true),
                valid: true,
            },
        )
    }

    #[test]
    fn test_effective_duration_clamps_to_input() {
        let request = TransformRequest::builder()
            .trim_start(Some(2.0))
            .trim_end(Some(100.0))
            .build()
            .unwrap();
        let eff = effective_duration(&video("a.mp4", 10.0), &request).unwrap();
        assert_eq!(eff, Some(8.0));
    }

    #[test]
    fn test_trim_start_beyond_input() {
        let request = TransformRequest::builder()
            .trim_start(Some(12.0))
            .build()
            .unwrap();
        let err = effective_duration(&video("a.mp4", 10.0), &request).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRange { option: "trim-start", .. }));
    }

    #[test]
    fn test_output_extension_fallback() {
        assert_eq!(output_extension(Path::new("out.mkv")), "mkv");
        assert_eq!(output_extension(Path::new("out")), "mp4");
    }

    #[test]
    fn test_intermediates_live_in_scratch() {
        let request = TransformRequest::default();
        let inputs = InputSet::new(vec![video("/v/a.mp4", 4.0), video("/v/b.mp4", 4.0)]);
        let graph = compose(&inputs, &request, Path::new("/out/x.mkv"), Path::new("/scratch")).unwrap();
        assert_eq!(
            intermediate_outputs(&graph, Path::new("/scratch")),
            vec![
                PathBuf::from("/scratch/a_norm_0.mkv"),
                PathBuf::from("/scratch/b_norm_1.mkv")
            ]
        );
    }

    #[test]
    fn test_second_composition_gets_its_own_intermediates() {
        let sources = vec![
            Source::file(video("/v/a.mp4", 4.0)),
            Source::file(video("/v/b.mp4", 4.0)),
        ];
        let scratch = Path::new("/scratch");
        let mut graph = TaskGraph::new();
        let fast = TransformRequest::builder()
            .dur_scale(Some(0.5))
            .build()
            .unwrap();
        let full = TransformRequest::default();

        compose_into(&mut graph, &sources, &full, Path::new("/out/full.mp4"), scratch).unwrap();
        compose_into(&mut graph, &sources, &fast, Path::new("/out/fast.mp4"), scratch).unwrap();

        let intermediates = intermediate_outputs(&graph, scratch);
        assert_eq!(
            intermediates,
            vec![
                PathBuf::from("/scratch/a_norm_0.mp4"),
                PathBuf::from("/scratch/b_norm_1.mp4"),
                PathBuf::from("/scratch/a_norm_3.mp4"),
                PathBuf::from("/scratch/b_norm_4.mp4"),
            ]
        );
    }

    #[test]
    fn test_derived_metadata_reports_dropped_audio() {
        let mut silent = video("/v/b.mp4", 4.0);
        silent.metadata.has_audio = Some(false);
        let sources = vec![Source::file(video("/v/a.mp4", 4.0)), Source::file(silent)];
        let mut graph = TaskGraph::new();

        let composition = compose_into(
            &mut graph,
            &sources,
            &TransformRequest::default(),
            Path::new("/out/x.mp4"),
            Path::new("/scratch"),
        )
        .unwrap();

        assert_eq!(composition.metadata.has_audio, Some(false));
    }
}
