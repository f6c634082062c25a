//! Media value types shared by input resolution, the cache and task composition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales both dimensions by `factor`, flooring each to an even value.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: crate::utils::floor_even(f64::from(self.width) * factor),
            height: crate::utils::floor_even(f64::from(self.height) * factor),
        }
    }
}

impl From<(u32, u32)> for Resolution {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl From<Resolution> for (u32, u32) {
    fn from(r: Resolution) -> Self {
        (r.width, r.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Rational frame rate as reported by ffprobe (e.g. `30000/1001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Parses `num/den` or a plain integer. Zero rates (`0/0`) yield None.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (num, den) = match text.trim().split_once('/') {
            Some((n, d)) => (n.parse::<u32>().ok()?, d.parse::<u32>().ok()?),
            None => (text.trim().parse::<u32>().ok()?, 1),
        };
        (num > 0 && den > 0).then_some(Self { num, den })
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl From<(u32, u32)> for FrameRate {
    fn from((num, den): (u32, u32)) -> Self {
        Self { num, den }
    }
}

impl From<FrameRate> for (u32, u32) {
    fn from(r: FrameRate) -> Self {
        (r.num, r.den)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Attributes probed from a video file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: Option<f64>,
    pub resolution: Option<Resolution>,
    /// Codec name of the first video stream
    pub codec: Option<String>,
    pub frame_rate: Option<FrameRate>,
    /// Whether the file carries an audio stream, None if unknown
    pub has_audio: Option<bool>,
    /// False when probing failed or the file has no usable video stream
    pub valid: bool,
}

impl VideoMetadata {
    /// Metadata for a file that could not be probed.
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }
}

/// A resolved input video with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct InputVideo {
    pub path: PathBuf,
    pub metadata: VideoMetadata,
}

impl InputVideo {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, metadata: VideoMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }
}

/// Ordered, non-empty set of existing, valid input videos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSet {
    videos: Vec<InputVideo>,
}

impl InputSet {
    #[must_use]
    pub fn new(videos: Vec<InputVideo>) -> Self {
        Self { videos }
    }

    #[must_use]
    pub fn videos(&self) -> &[InputVideo] {
        &self.videos
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.videos.iter().map(|v| v.path.as_path())
    }

    /// Sum of known durations; None if any duration is unknown.
    #[must_use]
    pub fn total_duration(&self) -> Option<f64> {
        self.videos.iter().map(|v| v.metadata.duration).sum()
    }
}

impl From<Vec<InputVideo>> for InputSet {
    fn from(videos: Vec<InputVideo>) -> Self {
        Self::new(videos)
    }
}
