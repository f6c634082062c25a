//! Core library for composing video clips on top of ffmpeg.
//!
//! This crate resolves input videos (with an optional per-folder metadata
//! cache), validates transformation options, composes them into an explicit
//! graph of ffmpeg tasks and runs that graph with bounded parallelism.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipsmith_core::{
//!     ForgeContext, FfprobeProber, ResolveOptions, TaskRunner, TranscodeInvoker,
//!     TransformRequest, resolve_inputs,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let request = TransformRequest::builder()
//!     .trim_start(Some(2.0))
//!     .res_target(Some("1280:720"))
//!     .build()
//!     .unwrap();
//!
//! let inputs = resolve_inputs(
//!     &[PathBuf::from("/videos/trip")],
//!     ResolveOptions { cache: true, recursive: true },
//!     &FfprobeProber,
//! )
//! .unwrap();
//!
//! let mut ctx = ForgeContext::new(Path::new("/videos")).unwrap();
//! ctx.forge("/videos/trip.mp4", &inputs, &request).unwrap();
//! let report = ctx
//!     .run(&TaskRunner::new(4), &TranscodeInvoker::from_env(), |_, _| {})
//!     .unwrap();
//! report.into_result().unwrap();
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod external;
pub mod logging;
pub mod media;
pub mod operation;
pub mod profile;
pub mod runner;
pub mod tasks;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::EncoderSettings;
pub use context::{Clip, ForgeContext};
pub use discovery::{ResolveOptions, resolve_inputs};
pub use error::{CoreError, CoreResult};
pub use external::{
    FfmpegSpawner, FfprobeProber, MetadataProber, ProbeOutcome, SidecarSpawner, TaskExecutor,
    TranscodeInvoker,
};
pub use media::{FrameRate, InputSet, InputVideo, Resolution, VideoMetadata};
pub use operation::{
    DurationChange, LogLevel, ResolutionChange, TransformRequest, TransformRequestBuilder,
};
pub use runner::{RunReport, TaskOutcome, TaskRunner};
pub use tasks::{ForgeTask, TaskAction, TaskGraph, TaskId, TransformParams, compose};
pub use utils::{format_duration, parse_offset};
