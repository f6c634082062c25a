//! FFprobe integration for reading video metadata.
//!
//! Probing never fails hard: a file ffprobe cannot read, or one without a
//! video stream, is reported as invalid metadata so that folder scans can
//! skip it and keep going.

use crate::media::{FrameRate, Resolution, VideoMetadata};
use ffprobe::{FfProbe, ffprobe};
use std::path::Path;

/// Something that can read the metadata of a video file.
pub trait MetadataProber: Sync {
    /// Probes `path`. Returns invalid metadata plus a reason if it cannot be read.
    fn probe(&self, path: &Path) -> ProbeOutcome;
}

/// Metadata of a probed file, and why it is invalid when it is.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub metadata: VideoMetadata,
    pub reason: Option<String>,
}

impl ProbeOutcome {
    #[must_use]
    pub fn valid(metadata: VideoMetadata) -> Self {
        Self {
            metadata,
            reason: None,
        }
    }

    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            metadata: VideoMetadata::invalid(),
            reason: Some(reason.into()),
        }
    }
}

/// Probes files with the `ffprobe` binary on PATH.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeProber;

impl MetadataProber for FfprobeProber {
    fn probe(&self, path: &Path) -> ProbeOutcome {
        log::debug!("Running ffprobe on: {}", path.display());
        match ffprobe(path) {
            Ok(info) => metadata_from_probe(&info),
            Err(err) => {
                log::debug!("ffprobe failed for {}: {:?}", path.display(), err);
                ProbeOutcome::invalid(err.to_string())
            }
        }
    }
}

/// Extracts the attributes of the first video stream and the container duration.
fn metadata_from_probe(info: &FfProbe) -> ProbeOutcome {
    let Some(stream) = info
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    else {
        return ProbeOutcome::invalid("no video stream found");
    };

    let duration = info
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);
    let Some(duration) = duration else {
        return ProbeOutcome::invalid("duration could not be determined");
    };

    let resolution = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => {
            u32::try_from(w)
                .ok()
                .zip(u32::try_from(h).ok())
                .map(Resolution::from)
        }
        _ => None,
    };

    ProbeOutcome::valid(VideoMetadata {
        duration: Some(duration),
        resolution,
        codec: stream.codec_name.clone(),
        frame_rate: FrameRate::parse(&stream.avg_frame_rate)
            .or_else(|| FrameRate::parse(&stream.r_frame_rate)),
        has_audio: Some(
            info.streams
                .iter()
                .any(|s| s.codec_type.as_deref() == Some("audio")),
        ),
        valid: true,
    })
}
