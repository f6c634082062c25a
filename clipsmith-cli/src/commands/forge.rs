// ============================================================================
// clipsmith-cli/src/commands/forge.rs
// ============================================================================
//
// FORGE COMMAND: resolve inputs, plan ffmpeg tasks and run them
//
// Order of checks matters for the user: option validation happens before
// anything touches the filesystem or external tools, and the ffmpeg/ffprobe
// check happens before any input is probed.

use crate::cli::ForgeArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{plan_json, print_plan, print_summary};
use crate::progress::TaskProgress;

use clipsmith_core::config::default_jobs;
use clipsmith_core::external::check_dependencies;
use clipsmith_core::{
    FfprobeProber, ForgeContext, ResolveOptions, TaskRunner, TranscodeInvoker, TransformRequest,
    format_duration, resolve_inputs,
};
use log::{debug, info};

use std::path::PathBuf;
use std::time::Instant;

/// Builds a validated request from the command-line options.
pub fn build_request(args: &ForgeArgs) -> CliResult<TransformRequest> {
    let request = TransformRequest::builder()
        .trim_start(args.trim_start)
        .trim_end(args.trim_end)
        .dur_scale(args.dur_scale)
        .dur_target(args.dur_target)
        .res_scale(args.res_scale)
        .res_target(args.res_target.as_deref())
        .audio(args.audio_choice())
        .cache(args.cache_enabled())
        .recursive(args.recursive_enabled())
        .log_level(args.log_level.as_str())
        .build()?;
    Ok(request)
}

/// Folder that will hold the scratch directory: `--temp-dir`, else the output's folder.
pub fn scratch_parent(args: &ForgeArgs) -> PathBuf {
    if let Some(dir) = &args.temp_dir {
        return dir.clone();
    }
    match args.output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Main entry point for the forge command.
pub fn run_forge(args: ForgeArgs) -> CliResult<()> {
    let started = Instant::now();

    let request = build_request(&args)?;
    debug!("Request: {:?}", request);

    check_dependencies()?;

    let inputs = resolve_inputs(&args.inputs, ResolveOptions::from(&request), &FfprobeProber)?;
    match inputs.total_duration() {
        Some(total) => info!("Forging {} input(s), {} in total", inputs.len(), format_duration(total)),
        None => info!("Forging {} input(s)", inputs.len()),
    }

    let scratch_parent = scratch_parent(&args);
    std::fs::create_dir_all(&scratch_parent).cli_with_context(|| {
        format!("Failed to create folder {}", scratch_parent.display())
    })?;
    let mut ctx = ForgeContext::new(&scratch_parent)?;
    let clip = ctx.forge(&args.output, &inputs, &request)?;

    if args.dry_run {
        if args.json {
            println!("{}", plan_json(ctx.graph(), &clip, ctx.scratch_dir())?);
        } else {
            print_plan(ctx.graph(), &clip, ctx.scratch_dir());
        }
        return Ok(());
    }

    let runner = TaskRunner::new(args.jobs.unwrap_or_else(default_jobs));
    let invoker = TranscodeInvoker::from_env();
    let progress = TaskProgress::new(ctx.graph().len(), true);
    let report = ctx.run(&runner, &invoker, |task, outcome| {
        progress.task_finished(task, outcome);
    })?;
    progress.finish();

    print_summary(&report, started.elapsed());
    if args.keep_temp {
        ctx.keep_scratch();
    }

    let written = report.into_result()?;
    info!("Wrote {} file(s), final output {}", written.len(), clip.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use clipsmith_core::CoreError;

    fn forge_args(extra: &[&str]) -> ForgeArgs {
        let mut argv = vec!["clipsmith", "forge", "in.mp4", "out/clip.mp4"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Forge(args) => args,
            Commands::Profiles { .. } => panic!("expected forge"),
        }
    }

    #[test]
    fn test_request_from_flags() {
        let request = build_request(&forge_args(&["--dur-scale", "0.5", "--res-target", "1280:720"]))
            .unwrap();
        assert!(!request.audio());
        assert!(!request.cache());
        assert!(request.recursive());
    }

    #[test]
    fn test_explicit_audio_with_time_change_is_rejected() {
        let err = build_request(&forge_args(&["--dur-scale", "0.5", "--audio"])).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedCombination(_)));
    }

    #[test]
    fn test_scratch_parent_defaults() {
        assert_eq!(scratch_parent(&forge_args(&[])), PathBuf::from("out"));
        assert_eq!(
            scratch_parent(&forge_args(&["--temp-dir", "/tmp/work"])),
            PathBuf::from("/tmp/work")
        );

        let bare = match Cli::try_parse_from(["clipsmith", "forge", "in.mp4", "clip.mp4"])
            .unwrap()
            .command
        {
            Commands::Forge(args) => args,
            Commands::Profiles { .. } => panic!("expected forge"),
        };
        assert_eq!(scratch_parent(&bare), PathBuf::from("."));
    }
}
