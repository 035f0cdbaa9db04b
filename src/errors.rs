// src/errors.rs

//! Crate-wide error aliases and the job error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Terminal error of a single audio-replacement job.
///
/// None of these are retried: a failed job must be re-initiated by the caller
/// with a fresh [`crate::job::Job`].
#[derive(Error, Debug)]
pub enum JobError {
    /// A source file is missing or unreadable. Raised before the tool
    /// preflight runs and before anything is spawned.
    #[error("input file missing or unreadable: {}", path.display())]
    InvalidInput { path: PathBuf },

    /// The external media tool could not be resolved or failed its
    /// version probe.
    #[error("media tool '{tool}' not found or not runnable")]
    ToolNotFound { tool: String },

    /// The tool process exited with a nonzero status. `tail` holds the most
    /// recent diagnostic lines seen before exit.
    #[error("media tool exited with status {code}")]
    ToolExecutionFailed { code: i32, tail: Vec<String> },

    /// The caller requested termination while the job was active.
    #[error("job cancelled")]
    Cancelled,

    /// Spawn or stream I/O failure, with the underlying cause attached.
    #[error("unexpected process failure: {0}")]
    Unexpected(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RetrackError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RetrackError>;
