// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `retrack`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "retrack",
    version,
    about = "Replace the audio track of a video file without re-encoding the video stream.",
    long_about = None
)]
pub struct CliArgs {
    /// Video file whose audio track will be replaced.
    pub video: PathBuf,

    /// Audio file to mux in as the new track.
    pub audio: PathBuf,

    /// Output file path.
    ///
    /// Default: the video path with `_X` inserted into the stem, e.g.
    /// `clip.mp4` -> `clip_X.mp4`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Replace the output file if it already exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Reveal the output folder in the system file manager after success.
    #[arg(long)]
    pub open: bool,

    /// Print the media tool command line, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the config file (TOML).
    ///
    /// Default: `Retrack.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RETRACK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
