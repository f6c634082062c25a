//! Validated transformation options for a forge operation.
//!
//! A `TransformRequest` can only be obtained from
//! [`TransformRequestBuilder::build`], which checks every cross-field rule
//! before handing out the value. Once built the request is immutable.

mod builder;

pub use builder::TransformRequestBuilder;

use crate::error::CoreError;
use crate::media::Resolution;

use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// How the duration of the output relates to the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationChange {
    /// Multiply the (trimmed) duration by this factor.
    Scale(f64),
    /// Stretch or compress to this many seconds in total.
    Target(f64),
}

/// How the resolution of the output relates to the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolutionChange {
    /// Multiply both dimensions by this factor.
    Scale(f64),
    /// Use this exact frame size.
    Target(Resolution),
}

/// Verbosity for both our own logging and ffmpeg's `-loglevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }

    /// Value for ffmpeg's `-loglevel` option.
    #[must_use]
    pub fn ffmpeg_level(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(CoreError::InvalidValue {
                option: "log-level",
                value: s.to_string(),
                reason: "expected one of error, warn, info, debug, trace",
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// The fully validated option set of one forge invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub(crate) trim_start: Option<f64>,
    pub(crate) trim_end: Option<f64>,
    pub(crate) duration: Option<DurationChange>,
    pub(crate) resolution: Option<ResolutionChange>,
    pub(crate) audio: bool,
    pub(crate) cache: bool,
    pub(crate) recursive: bool,
    pub(crate) log_level: LogLevel,
}

impl TransformRequest {
    /// Starts a builder with every option unset.
    #[must_use]
    pub fn builder() -> TransformRequestBuilder {
        TransformRequestBuilder::new()
    }

    /// Start offset in seconds.
    #[must_use]
    pub fn trim_start(&self) -> Option<f64> {
        self.trim_start
    }

    /// End offset in seconds.
    #[must_use]
    pub fn trim_end(&self) -> Option<f64> {
        self.trim_end
    }

    #[must_use]
    pub fn duration(&self) -> Option<DurationChange> {
        self.duration
    }

    #[must_use]
    pub fn resolution(&self) -> Option<ResolutionChange> {
        self.resolution
    }

    /// Whether audio streams are passed through.
    #[must_use]
    pub fn audio(&self) -> bool {
        self.audio
    }

    /// Whether folder metadata caches are read and written.
    #[must_use]
    pub fn cache(&self) -> bool {
        self.cache
    }

    /// Whether folders are traversed into subfolders.
    #[must_use]
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }
}

impl Default for TransformRequest {
    /// No trimming, no scaling, audio on, cache off, recursive traversal.
    fn default() -> Self {
        Self {
            trim_start: None,
            trim_end: None,
            duration: None,
            resolution: None,
            audio: true,
            cache: false,
            recursive: true,
            log_level: LogLevel::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Warn.ffmpeg_level(), "warning");
        assert_eq!(LogLevel::Debug.level_filter(), LevelFilter::Debug);
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(CoreError::InvalidValue { option: "log-level", .. })
        ));
    }

    #[test]
    fn test_default_request() {
        let request = TransformRequest::default();
        assert!(request.audio());
        assert!(!request.cache());
        assert!(request.recursive());
        assert_eq!(request.log_level(), LogLevel::Info);
    }
}
