//! Utility functions for time parsing, formatting and path checks.

use crate::config::VIDEO_EXTENSIONS;
use std::path::Path;

/// Returns true if the path has a recognized video extension (case-insensitive).
/// Does not touch the file system.
#[must_use]
pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Returns true for dot-files and dot-folders.
#[must_use]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Parses an offset given either as plain seconds (`"12.5"`) or as a
/// timecode (`"MM:SS"`, `"HH:MM:SS"`, `"HH:MM:SS.fff"`).
///
/// Returns None if the text is neither. Negative values are returned as-is
/// so that validation can report them with the option name.
#[must_use]
pub fn parse_offset(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if !text.contains(':') {
        return text.parse::<f64>().ok();
    }

    let parts: Vec<&str> = text.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };
    let hours = hours.parse::<u64>().ok()?;
    let minutes = minutes.parse::<u64>().ok()?;
    let seconds = seconds.parse::<f64>().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Formats seconds as HH:MM:SS.mmm (e.g., 3725.5 -> "01:02:05.500"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_millis = (seconds * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Formats a seconds value for an ffmpeg argument without float noise.
#[must_use]
pub fn format_seconds_arg(seconds: f64) -> String {
    let rounded = format!("{seconds:.6}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Floors a scaled dimension to an even number of pixels, minimum 2.
/// Most encoders reject odd dimensions for 4:2:0 output.
#[must_use]
pub fn floor_even(value: f64) -> u32 {
    let floored = value.max(0.0).floor() as u32;
    (floored & !1).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_has_video_extension() {
        assert!(has_video_extension(&PathBuf::from("a.mp4")));
        assert!(has_video_extension(&PathBuf::from("dir/B.MOV")));
        assert!(!has_video_extension(&PathBuf::from("notes.txt")));
        assert!(!has_video_extension(&PathBuf::from("no_extension")));
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(&PathBuf::from("/x/.clipsmith_cache.yaml")));
        assert!(!is_hidden(&PathBuf::from("/x/clip.mp4")));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("12.5"), Some(12.5));
        assert_eq!(parse_offset(" 3 "), Some(3.0));
        assert_eq!(parse_offset("01:30"), Some(90.0));
        assert_eq!(parse_offset("01:02:05.5"), Some(3725.5));
        assert_eq!(parse_offset("-2"), Some(-2.0));
        assert_eq!(parse_offset("1:75"), None);
        assert_eq!(parse_offset("a:b"), None);
        assert_eq!(parse_offset("1:2:3:4"), None);
        assert_eq!(parse_offset(""), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3725.5), "01:02:05.500");
        assert_eq!(format_duration(0.0), "00:00:00.000");
        assert_eq!(format_duration(-1.0), "??:??:??");
    }

    #[test]
    fn test_format_seconds_arg() {
        assert_eq!(format_seconds_arg(2.5), "2.5");
        assert_eq!(format_seconds_arg(10.0), "10");
        assert_eq!(format_seconds_arg(0.0), "0");
        assert_eq!(format_seconds_arg(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn test_floor_even() {
        assert_eq!(floor_even(959.9), 958);
        assert_eq!(floor_even(540.0), 540);
        assert_eq!(floor_even(1.0), 2);
    }
}
