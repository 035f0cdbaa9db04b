// src/engine/runtime.rs

use std::fmt;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::invocation::build_invocation;
use crate::exec::runner::RunPlan;
use crate::exec::{CancelHandle, ToolBackend};
use crate::job::Outcome;

use super::core::{CoreCommand, CoreController};
use super::JobEvent;

/// Drives the job lifecycle in response to `JobEvent`s, and delegates actual
/// tool execution to a `ToolBackend`.
///
/// This is a pure IO shell around `CoreController`, which contains all the
/// lifecycle semantics. This struct handles async IO: draining the single
/// event channel in arrival order, launching the preflight probe, relaying
/// diagnostic lines, and holding the live cancel handle.
pub struct Runtime<B: ToolBackend> {
    core: CoreController,
    event_rx: mpsc::Receiver<JobEvent>,
    backend: B,
    /// Partial-output policy threaded into each run plan.
    keep_partial: bool,
    cancel: Option<CancelHandle>,
    outcome: Option<Outcome>,
}

impl<B: ToolBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: ToolBackend> Runtime<B> {
    pub fn new(
        core: CoreController,
        event_rx: mpsc::Receiver<JobEvent>,
        backend: B,
        keep_partial: bool,
    ) -> Self {
        Self {
            core,
            event_rx,
            backend,
            keep_partial,
            cancel: None,
            outcome: None,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `JobEvent`s from `event_rx`, strictly in arrival order.
    /// - Feeds them into the core controller.
    /// - Executes the commands returned by the core.
    ///
    /// Resolves with the job's terminal outcome.
    pub async fn run(mut self) -> Result<Outcome> {
        info!("retrack controller started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "controller received event");

            // Feed the event into the pure core and get commands back.
            let step = self.core.step(event);

            // Execute the commands.
            for command in step.commands {
                self.execute_command(command).await?;
            }

            // If the core says to stop, break out of the loop.
            if !step.keep_running {
                info!("job resolved; stopping controller");
                break;
            }
        }

        self.outcome.ok_or_else(|| {
            anyhow!("event channel closed before the job reached a terminal outcome").into()
        })
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartPreflight => {
                // The probe may block on the version check; run it off the
                // event loop so a cancel can still be observed meanwhile.
                tokio::spawn(self.backend.probe());
            }
            CoreCommand::SpawnTool { job, tool } => {
                let plan = RunPlan {
                    invocation: build_invocation(&job, &tool),
                    output_path: job.output_path.clone(),
                    keep_partial: self.keep_partial,
                };
                let handle = self.backend.run_job(plan).await?;
                self.cancel = Some(handle);
            }
            CoreCommand::ForwardDiagnostic { line } => {
                // The diagnostic relay is the payload of this program; it
                // goes to stdout while logs stay on stderr.
                println!("{line}");
            }
            CoreCommand::TerminateTool => match self.cancel.take() {
                Some(mut handle) => {
                    if !handle.cancel() {
                        debug!("run already resolved; nothing to terminate");
                    }
                }
                None => debug!("no live tool process to terminate"),
            },
            CoreCommand::RejectJob { job } => {
                warn!(
                    video = %job.video_path.display(),
                    "a job is already active; rejecting new request"
                );
            }
            CoreCommand::ReportOutcome { outcome } => {
                self.cancel = None;
                self.outcome = Some(outcome);
            }
        }
        Ok(())
    }
}
