// ============================================================================
// clipsmith-core/src/operation/builder.rs
// ============================================================================
//
// VALIDATION: Builder collecting raw option values
//
// `build()` checks the rules in a fixed order and reports the first failure,
// so the same bad command line always produces the same error:
//
//   1. --dur-scale vs --dur-target
//   2. --res-scale vs --res-target
//   3. explicit --audio with a duration change
//   4. --res-target format
//   5. numeric values and log level
//   6. trim range

use super::{DurationChange, LogLevel, ResolutionChange, TransformRequest};
use crate::error::{CoreError, CoreResult};
use crate::media::Resolution;

use log::info;

/// Collects unvalidated option values for a [`TransformRequest`].
#[derive(Debug, Clone, Default)]
pub struct TransformRequestBuilder {
    trim_start: Option<f64>,
    trim_end: Option<f64>,
    dur_scale: Option<f64>,
    dur_target: Option<f64>,
    res_scale: Option<f64>,
    res_target: Option<String>,
    audio: Option<bool>,
    cache: Option<bool>,
    recursive: Option<bool>,
    log_level: Option<String>,
}

impl TransformRequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn trim_start(mut self, seconds: Option<f64>) -> Self {
        self.trim_start = seconds;
        self
    }

    #[must_use]
    pub fn trim_end(mut self, seconds: Option<f64>) -> Self {
        self.trim_end = seconds;
        self
    }

    #[must_use]
    pub fn dur_scale(mut self, factor: Option<f64>) -> Self {
        self.dur_scale = factor;
        self
    }

    #[must_use]
    pub fn dur_target(mut self, seconds: Option<f64>) -> Self {
        self.dur_target = seconds;
        self
    }

    #[must_use]
    pub fn res_scale(mut self, factor: Option<f64>) -> Self {
        self.res_scale = factor;
        self
    }

    /// Target resolution as written on the command line (`WIDTH:HEIGHT`).
    #[must_use]
    pub fn res_target(mut self, value: Option<impl Into<String>>) -> Self {
        self.res_target = value.map(Into::into);
        self
    }

    /// `None` leaves audio at its default (on unless the duration changes).
    #[must_use]
    pub fn audio(mut self, enabled: Option<bool>) -> Self {
        self.audio = enabled;
        self
    }

    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = Some(enabled);
        self
    }

    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.recursive = Some(enabled);
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Validates the collected values and produces the request.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as `ConflictingOptions`,
    /// `UnsupportedCombination`, `InvalidFormat`, `InvalidValue` or
    /// `InvalidRange`.
    pub fn build(self) -> CoreResult<TransformRequest> {
        if self.dur_scale.is_some() && self.dur_target.is_some() {
            return Err(CoreError::ConflictingOptions("dur-scale", "dur-target"));
        }
        if self.res_scale.is_some() && self.res_target.is_some() {
            return Err(CoreError::ConflictingOptions("res-scale", "res-target"));
        }

        let changes_duration = self.dur_scale.is_some() || self.dur_target.is_some();
        if changes_duration && self.audio == Some(true) {
            return Err(CoreError::UnsupportedCombination("audio+time-scale"));
        }

        let res_target = self
            .res_target
            .as_deref()
            .map(parse_resolution)
            .transpose()?;

        check_positive("dur-scale", self.dur_scale)?;
        check_positive("dur-target", self.dur_target)?;
        check_positive("res-scale", self.res_scale)?;
        check_non_negative("trim-start", self.trim_start)?;
        check_non_negative("trim-end", self.trim_end)?;
        let log_level = match self.log_level.as_deref() {
            Some(text) => text.parse::<LogLevel>()?,
            None => LogLevel::default(),
        };

        if let (Some(start), Some(end)) = (self.trim_start, self.trim_end) {
            if end <= start {
                return Err(CoreError::InvalidRange {
                    option: "trim-start/trim-end",
                    start,
                    end,
                });
            }
        }

        let duration = match (self.dur_scale, self.dur_target) {
            (Some(factor), _) => Some(DurationChange::Scale(factor)),
            (_, Some(seconds)) => Some(DurationChange::Target(seconds)),
            _ => None,
        };
        let resolution = match (self.res_scale, res_target) {
            (Some(factor), _) => Some(ResolutionChange::Scale(factor)),
            (_, Some(target)) => Some(ResolutionChange::Target(target)),
            _ => None,
        };

        let audio = match self.audio {
            Some(enabled) => enabled,
            None if changes_duration => {
                info!("Audio disabled: the duration change cannot keep audio in sync");
                false
            }
            None => true,
        };

        Ok(TransformRequest {
            trim_start: self.trim_start,
            trim_end: self.trim_end,
            duration,
            resolution,
            audio,
            cache: self.cache.unwrap_or(false),
            recursive: self.recursive.unwrap_or(true),
            log_level,
        })
    }
}

/// Parses `WIDTH:HEIGHT` with both parts positive integers.
fn parse_resolution(text: &str) -> CoreResult<Resolution> {
    let invalid = || CoreError::InvalidFormat {
        option: "res-target",
        value: text.to_string(),
        expected: "WIDTH:HEIGHT with positive integers, e.g. 1280:720",
    };

    let (width, height) = text.trim().split_once(':').ok_or_else(invalid)?;
    let width = width.parse::<u32>().map_err(|_| invalid())?;
    let height = height.parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok(Resolution::new(width, height))
}

fn check_positive(option: &'static str, value: Option<f64>) -> CoreResult<()> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(CoreError::InvalidValue {
            option,
            value: v.to_string(),
            reason: "must be a positive number",
        }),
        _ => Ok(()),
    }
}

fn check_non_negative(option: &'static str, value: Option<f64>) -> CoreResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(CoreError::InvalidValue {
            option,
            value: v.to_string(),
            reason: "must not be negative",
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = TransformRequestBuilder::new().build().unwrap();
        assert_eq!(request, TransformRequest::default());
    }

    #[test]
    fn test_duration_conflict() {
        let err = TransformRequestBuilder::new()
            .dur_scale(Some(2.0))
            .dur_target(Some(10.0))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ConflictingOptions("dur-scale", "dur-target")
        ));
    }

    #[test]
    fn test_resolution_conflict() {
        let err = TransformRequestBuilder::new()
            .res_scale(Some(0.5))
            .res_target(Some("1280:720"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ConflictingOptions("res-scale", "res-target")
        ));
    }

    #[test]
    fn test_conflict_reported_before_format() {
        let err = TransformRequestBuilder::new()
            .res_scale(Some(0.5))
            .res_target(Some("garbage"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::ConflictingOptions(..)));
    }

    #[test]
    fn test_explicit_audio_with_time_scale_is_rejected() {
        let err = TransformRequestBuilder::new()
            .audio(Some(true))
            .dur_scale(Some(0.5))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedCombination("audio+time-scale")
        ));
    }

    #[test]
    fn test_default_audio_is_dropped_with_time_scale() {
        let request = TransformRequestBuilder::new()
            .dur_scale(Some(0.5))
            .build()
            .unwrap();
        assert!(!request.audio());
        assert_eq!(request.duration(), Some(DurationChange::Scale(0.5)));

        let request = TransformRequestBuilder::new().build().unwrap();
        assert!(request.audio());
    }

    #[test]
    fn test_res_target_format() {
        for bad in ["1920x1080", "1920:", ":1080", "0:1080", "-1:2", "a:b"] {
            let err = TransformRequestBuilder::new()
                .res_target(Some(bad))
                .build()
                .unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidFormat { option: "res-target", .. }),
                "{bad} should be rejected"
            );
        }

        let request = TransformRequestBuilder::new()
            .res_target(Some("1280:720"))
            .build()
            .unwrap();
        assert_eq!(
            request.resolution(),
            Some(ResolutionChange::Target(Resolution::new(1280, 720)))
        );
    }

    #[test]
    fn test_numeric_values() {
        let err = TransformRequestBuilder::new()
            .dur_scale(Some(0.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { option: "dur-scale", .. }));

        let err = TransformRequestBuilder::new()
            .res_scale(Some(f64::NAN))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { option: "res-scale", .. }));

        let err = TransformRequestBuilder::new()
            .trim_start(Some(-1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { option: "trim-start", .. }));

        let err = TransformRequestBuilder::new()
            .log_level("chatty")
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { option: "log-level", .. }));
    }

    #[test]
    fn test_trim_range() {
        let err = TransformRequestBuilder::new()
            .trim_start(Some(5.0))
            .trim_end(Some(5.0))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidRange { option: "trim-start/trim-end", .. }
        ));

        let request = TransformRequestBuilder::new()
            .trim_start(Some(2.0))
            .trim_end(Some(7.0))
            .build()
            .unwrap();
        assert_eq!(request.trim_start(), Some(2.0));
        assert_eq!(request.trim_end(), Some(7.0));
    }
}
