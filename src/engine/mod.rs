// src/engine/mod.rs

//! Foreground controller for audio-replacement jobs.
//!
//! This module ties together:
//! - the job lifecycle state machine (`Idle -> Preflighting -> Running -> Done`)
//! - the single event channel every observable update travels over:
//!   - job requests from the CLI shell
//!   - preflight results
//!   - diagnostic lines from the tool process
//!   - run outcomes
//!   - cancellation requests (Ctrl-C)
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. All mutation funnels through the runtime's
//! single-consumer receive loop, so the busy flag and the live cancel handle
//! need no locking.

use std::path::PathBuf;

use crate::errors::JobError;
use crate::job::{Job, Outcome};

/// Events flowing into the controller from the shell, the preflight probe,
/// and the tool runner.
#[derive(Debug)]
pub enum JobEvent {
    /// A new job should start processing.
    JobRequested { job: Job },
    /// The tool preflight passed; `tool` is the resolved binary path.
    PreflightPassed { tool: PathBuf },
    /// The tool preflight failed; the job never spawns.
    PreflightFailed { error: JobError },
    /// One line of the tool's diagnostic stream, in arrival order.
    Diagnostic { line: String },
    /// The tool process resolved with a terminal outcome.
    Finished { outcome: Outcome },
    /// Caller-initiated termination of the active job.
    CancelRequested,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// If true, stop the event loop once the job reports its outcome
    /// (the normal single-job CLI mode).
    pub exit_when_done: bool,
}

pub mod core;
pub mod runtime;

pub use self::core::{CoreCommand, CoreController, CoreStep, Phase};
pub use runtime::Runtime;
