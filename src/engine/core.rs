// src/engine/core.rs

//! Pure core controller state machine.
//!
//! This module contains a synchronous, deterministic controller that consumes
//! [`JobEvent`]s and produces:
//! - an updated phase
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from the channel
//! - launching the preflight probe and the tool backend
//! - holding the live cancel handle
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or processes.

use std::path::PathBuf;

use tracing::debug;

use crate::engine::{JobEvent, RuntimeOptions};
use crate::errors::JobError;
use crate::job::{Job, Outcome};

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Preflighting,
    Running,
    Done,
}

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug)]
pub enum CoreCommand {
    /// Launch the tool preflight probe.
    StartPreflight,
    /// Spawn the tool process for this job with the resolved binary.
    SpawnTool { job: Job, tool: PathBuf },
    /// Relay one diagnostic line to the observer.
    ForwardDiagnostic { line: String },
    /// Send the termination signal to the active tool process.
    TerminateTool,
    /// A job arrived while one was already active; surface the rejection.
    RejectJob { job: Job },
    /// The job resolved; deliver its terminal outcome.
    ReportOutcome { outcome: Outcome },
}

/// Decision returned by the core after handling a single `JobEvent`.
#[derive(Debug)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn cont(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Pure controller state.
///
/// Owns the busy invariant: at most one job may be actively processing at a
/// time. A second request while non-idle is rejected explicitly, never
/// silently interleaved and never queued.
#[derive(Debug)]
pub struct CoreController {
    phase: Phase,
    active: Option<Job>,
    cancel_requested: bool,
    options: RuntimeOptions,
}

impl CoreController {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            phase: Phase::Idle,
            active: None,
            cancel_requested: false,
            options,
        }
    }

    /// Expose the current phase (for tests).
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Handle a single event, updating core state and returning the resulting
    /// commands for the IO shell.
    pub fn step(&mut self, event: JobEvent) -> CoreStep {
        match event {
            JobEvent::JobRequested { job } => self.handle_job_requested(job),
            JobEvent::PreflightPassed { tool } => self.handle_preflight_passed(tool),
            JobEvent::PreflightFailed { error } => self.handle_preflight_failed(error),
            JobEvent::Diagnostic { line } => self.handle_diagnostic(line),
            JobEvent::Finished { outcome } => self.handle_finished(outcome),
            JobEvent::CancelRequested => self.handle_cancel_requested(),
        }
    }

    fn handle_job_requested(&mut self, job: Job) -> CoreStep {
        if self.phase != Phase::Idle {
            return CoreStep::cont(vec![CoreCommand::RejectJob { job }]);
        }

        self.phase = Phase::Preflighting;
        self.active = Some(job);
        self.cancel_requested = false;

        CoreStep::cont(vec![CoreCommand::StartPreflight])
    }

    fn handle_preflight_passed(&mut self, tool: PathBuf) -> CoreStep {
        if self.phase != Phase::Preflighting {
            debug!(phase = ?self.phase, "ignoring stray preflight result");
            return CoreStep::cont(Vec::new());
        }

        // Cancellation may have arrived while the probe was in flight; in
        // that case the job must not spawn at all.
        if self.cancel_requested {
            return self.finish(Outcome::Failure(JobError::Cancelled));
        }

        let Some(job) = self.active.clone() else {
            debug!("preflight passed with no active job");
            return CoreStep::cont(Vec::new());
        };

        self.phase = Phase::Running;
        CoreStep::cont(vec![CoreCommand::SpawnTool { job, tool }])
    }

    fn handle_preflight_failed(&mut self, error: JobError) -> CoreStep {
        if self.phase != Phase::Preflighting {
            debug!(phase = ?self.phase, "ignoring stray preflight result");
            return CoreStep::cont(Vec::new());
        }

        self.finish(Outcome::Failure(error))
    }

    fn handle_diagnostic(&mut self, line: String) -> CoreStep {
        if self.phase != Phase::Running {
            // Late lines can trail in after the outcome; drop them.
            return CoreStep::cont(Vec::new());
        }

        CoreStep::cont(vec![CoreCommand::ForwardDiagnostic { line }])
    }

    fn handle_finished(&mut self, outcome: Outcome) -> CoreStep {
        if self.phase != Phase::Running {
            debug!(phase = ?self.phase, "ignoring stray run outcome");
            return CoreStep::cont(Vec::new());
        }

        self.finish(outcome)
    }

    fn handle_cancel_requested(&mut self) -> CoreStep {
        match self.phase {
            Phase::Idle | Phase::Done => {
                debug!("cancel requested with no active job; ignoring");
                CoreStep::cont(Vec::new())
            }
            Phase::Preflighting => {
                // Remembered; acted on when the probe resolves.
                self.cancel_requested = true;
                CoreStep::cont(Vec::new())
            }
            Phase::Running => {
                if self.cancel_requested {
                    return CoreStep::cont(Vec::new());
                }
                self.cancel_requested = true;
                CoreStep::cont(vec![CoreCommand::TerminateTool])
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) -> CoreStep {
        self.phase = Phase::Done;
        self.active = None;

        CoreStep {
            commands: vec![CoreCommand::ReportOutcome { outcome }],
            keep_running: !self.options.exit_when_done,
        }
    }
}
