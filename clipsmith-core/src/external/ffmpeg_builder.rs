//! FFmpeg argument construction for forge tasks.
//!
//! Arguments are produced as plain strings so the exact command line can be
//! logged, shown in a dry run and checked in tests before anything is spawned.

use crate::config::EncoderSettings;
use crate::operation::LogLevel;
use crate::tasks::TransformParams;
use crate::utils::format_seconds_arg;

use std::path::Path;

/// Builder for constructing video filter chains
#[derive(Debug, Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stretches presentation timestamps; a factor above 1 slows the video down.
    #[must_use]
    pub fn add_time_scale(mut self, factor: f64) -> Self {
        self.filters
            .push(format!("setpts={}*PTS", format_seconds_arg(factor)));
        self
    }

    /// Scales to an exact frame size with square pixels.
    #[must_use]
    pub fn add_scale(mut self, width: u32, height: u32) -> Self {
        self.filters.push(format!("scale={width}:{height}"));
        self.filters.push("setsar=1".to_string());
        self
    }

    #[must_use]
    pub fn add_fps(mut self, rate: &str) -> Self {
        self.filters.push(format!("fps={rate}"));
        self
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

fn common_args(log_level: LogLevel) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-loglevel".to_string(),
        log_level.ffmpeg_level().to_string(),
    ]
}

/// Arguments re-encoding `input` into `output` with the given parameters.
#[must_use]
pub fn transform_args(
    input: &Path,
    params: &TransformParams,
    output: &Path,
    log_level: LogLevel,
    settings: &EncoderSettings,
) -> Vec<String> {
    let mut args = common_args(log_level);

    if let Some(start) = params.trim_start {
        args.push("-ss".to_string());
        args.push(format_seconds_arg(start));
    }
    args.push("-i".to_string());
    args.push(input.to_string_lossy().into_owned());

    let mut chain = VideoFilterChain::new();
    if let Some(factor) = params.time_scale {
        chain = chain.add_time_scale(factor);
    }
    if let Some(resolution) = params.resolution {
        chain = chain.add_scale(resolution.width, resolution.height);
    }
    if let Some(rate) = params.frame_rate {
        chain = chain.add_fps(&rate.to_string());
    }
    if let Some(filters) = chain.build() {
        args.push("-vf".to_string());
        args.push(filters);
    }

    if let Some(duration) = params.output_duration {
        args.push("-t".to_string());
        args.push(format_seconds_arg(duration));
    }

    args.extend(["-map", "0:v:0"].map(String::from));
    if params.audio {
        args.extend(["-map", "0:a?", "-c:a", "copy"].map(String::from));
    } else {
        args.push("-an".to_string());
    }

    args.push("-c:v".to_string());
    args.push(settings.video_codec.clone());
    args.push("-preset".to_string());
    args.push(settings.preset.clone());
    args.push("-crf".to_string());
    args.push(settings.crf.to_string());
    args.push("-pix_fmt".to_string());
    args.push("yuv420p".to_string());

    args.push(output.to_string_lossy().into_owned());
    args
}

/// Arguments joining the files listed in `list_file` without re-encoding.
#[must_use]
pub fn concat_args(list_file: &Path, output: &Path, log_level: LogLevel) -> Vec<String> {
    let mut args = common_args(log_level);
    args.extend(["-f", "concat", "-safe", "0", "-i"].map(String::from));
    args.push(list_file.to_string_lossy().into_owned());
    args.extend(["-c", "copy", "-map", "0"].map(String::from));
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Content of a concat demuxer list file naming `inputs` in order.
#[must_use]
pub fn concat_list<P: AsRef<Path>>(inputs: &[P]) -> String {
    inputs
        .iter()
        .map(|path| {
            let escaped = path.as_ref().to_string_lossy().replace('\'', "'\\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}
