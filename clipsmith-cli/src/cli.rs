// clipsmith-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use clipsmith_core::parse_offset;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "clipsmith: compose video clips with ffmpeg",
    long_about = "Trims, rescales and concatenates video clips by composing ffmpeg tasks via clipsmith-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates one output video from one or more input videos or folders
    Forge(ForgeArgs),
    /// Lists the built-in camera profiles
    Profiles {
        /// Show only this profile
        #[arg(value_name = "ID")]
        id: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ForgeArgs {
    /// Input video files and/or folders of videos
    #[arg(required = true, num_args = 1.., value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// Output video file
    #[arg(required = true, value_name = "OUTPUT")]
    pub output: PathBuf,

    // --- Trimming ---
    /// Start offset into each input (seconds or [HH:]MM:SS[.fff])
    #[arg(long, value_name = "OFFSET", value_parser = parse_offset_arg, allow_negative_numbers = true)]
    pub trim_start: Option<f64>,

    /// End offset into each input (seconds or [HH:]MM:SS[.fff])
    #[arg(long, value_name = "OFFSET", value_parser = parse_offset_arg, allow_negative_numbers = true)]
    pub trim_end: Option<f64>,

    // --- Duration ---
    /// Multiply the duration by this factor (e.g. 0.5 plays twice as fast)
    #[arg(long, value_name = "FACTOR", allow_negative_numbers = true)]
    pub dur_scale: Option<f64>,

    /// Stretch or compress the output to this total duration
    #[arg(long, value_name = "DURATION", value_parser = parse_offset_arg, allow_negative_numbers = true)]
    pub dur_target: Option<f64>,

    // --- Resolution ---
    /// Multiply width and height by this factor
    #[arg(long, value_name = "FACTOR", allow_negative_numbers = true)]
    pub res_scale: Option<f64>,

    /// Output resolution as WIDTH:HEIGHT (e.g. 1280:720)
    #[arg(long, value_name = "WIDTH:HEIGHT")]
    pub res_target: Option<String>,

    // --- Streams and inputs ---
    /// Pass audio through (default, unless the duration changes)
    #[arg(long, overrides_with = "no_audio")]
    pub audio: bool,

    /// Drop audio
    #[arg(long, overrides_with = "audio")]
    pub no_audio: bool,

    /// Read and write per-folder metadata caches
    #[arg(long, overrides_with = "no_cache")]
    pub cache: bool,

    /// Do not use metadata caches (default)
    #[arg(long, overrides_with = "cache")]
    pub no_cache: bool,

    /// Descend into subfolders of input folders (default)
    #[arg(long, overrides_with = "no_recursive")]
    pub recursive: bool,

    /// Only use videos directly inside input folders
    #[arg(long, overrides_with = "recursive")]
    pub no_recursive: bool,

    // --- Execution ---
    /// Log level for clipsmith and ffmpeg: error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Number of ffmpeg processes to run at once (defaults to available cores)
    #[arg(short, long, value_name = "N", env = "CLIPSMITH_JOBS")]
    pub jobs: Option<usize>,

    /// Directory in which to create the scratch folder (defaults to the output's folder)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Keep intermediate files after the run
    #[arg(long)]
    pub keep_temp: bool,

    /// Print the task plan without running ffmpeg
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Optional: Directory for log files
    #[arg(long, value_name = "LOG_DIR", env = "CLIPSMITH_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ForgeArgs {
    /// `Some` only if one of the audio flags was given.
    pub fn audio_choice(&self) -> Option<bool> {
        flag_pair(self.audio, self.no_audio)
    }

    pub fn cache_enabled(&self) -> bool {
        flag_pair(self.cache, self.no_cache).unwrap_or(false)
    }

    pub fn recursive_enabled(&self) -> bool {
        flag_pair(self.recursive, self.no_recursive).unwrap_or(true)
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn parse_offset_arg(value: &str) -> Result<f64, String> {
    parse_offset(value)
        .ok_or_else(|| format!("'{value}' is not a number of seconds or a [HH:]MM:SS timecode"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_forge_positionals_and_flags() {
        let cli = Cli::try_parse_from([
            "clipsmith",
            "forge",
            "a.mp4",
            "clips",
            "out.mp4",
            "--trim-start",
            "00:01:30",
            "--no-audio",
            "--cache",
        ])
        .unwrap();
        let Commands::Forge(args) = cli.command else {
            panic!("expected forge");
        };
        assert_eq!(args.inputs, vec![PathBuf::from("a.mp4"), PathBuf::from("clips")]);
        assert_eq!(args.output, PathBuf::from("out.mp4"));
        assert_eq!(args.trim_start, Some(90.0));
        assert_eq!(args.audio_choice(), Some(false));
        assert!(args.cache_enabled());
        assert!(args.recursive_enabled());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_last_audio_flag_wins() {
        let cli = Cli::try_parse_from([
            "clipsmith", "forge", "a.mp4", "out.mp4", "--no-audio", "--audio",
        ])
        .unwrap();
        let Commands::Forge(args) = cli.command else {
            panic!("expected forge");
        };
        assert_eq!(args.audio_choice(), Some(true));
    }

    #[test]
    fn test_negative_trim_reaches_validation() {
        let cli = Cli::try_parse_from(["clipsmith", "forge", "a.mp4", "out.mp4", "--trim-start", "-3"])
            .unwrap();
        let Commands::Forge(args) = cli.command else {
            panic!("expected forge");
        };
        assert_eq!(args.trim_start, Some(-3.0));
    }
}
