// src/exec/runner.rs

//! Single tool process runner.
//!
//! Spawns exactly one child per job, relays its diagnostic stream (stderr)
//! line-by-line as `JobEvent::Diagnostic`, waits for exit, and classifies the
//! outcome. The relay is live and ordered: every line is forwarded as it
//! arrives, never collected and delivered in one batch.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::engine::JobEvent;
use crate::errors::JobError;
use crate::exec::invocation::ToolInvocation;
use crate::job::Outcome;

/// Number of trailing diagnostic lines kept for failure reporting.
const DIAGNOSTIC_TAIL: usize = 16;

/// Everything the runner needs for one job.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub invocation: ToolInvocation,
    pub output_path: PathBuf,
    /// Keep a truncated output file after failure or cancellation.
    pub keep_partial: bool,
}

/// Run the tool process for one job, emitting `Diagnostic` events while it
/// runs and a single `Finished` event when it resolves.
///
/// - If the cancel channel fires, the child process is killed (best-effort)
///   and the run still resolves, with a `Cancelled` outcome.
/// - Spawn and stream I/O failures resolve as `Unexpected`.
pub async fn run_tool(
    plan: RunPlan,
    event_tx: mpsc::Sender<JobEvent>,
    cancel_rx: oneshot::Receiver<()>,
) {
    let outcome = match run_tool_inner(plan, &event_tx, cancel_rx).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "tool execution error");
            Outcome::Failure(err)
        }
    };

    if event_tx.send(JobEvent::Finished { outcome }).await.is_err() {
        debug!("controller went away before the run outcome was delivered");
    }
}

async fn run_tool_inner(
    plan: RunPlan,
    event_tx: &mpsc::Sender<JobEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<Outcome, JobError> {
    info!(
        tool = %plan.invocation.program.display(),
        output = %plan.output_path.display(),
        "starting tool process"
    );

    // Recorded before the spawn so the cleanup policy can tell a truncated
    // file of our own making from a pre-existing one.
    let output_preexisted = plan.output_path.exists();

    let mut child = Command::new(&plan.invocation.program)
        .args(&plan.invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr pipe missing"))?;

    let mut lines = BufReader::new(stderr).lines();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_TAIL);
    let mut cancelled = false;
    let mut cancel_seen = false;

    // The diagnostic stream closes when the child exits (or is killed), so
    // this loop always terminates; the wait below then reaps the process.
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if tail.len() == DIAGNOSTIC_TAIL {
                        tail.pop_front();
                    }
                    tail.push_back(line.clone());

                    if event_tx.send(JobEvent::Diagnostic { line }).await.is_err() {
                        // Observer gone; keep draining so the pipe never fills.
                        debug!("diagnostic receiver dropped; draining stream");
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "diagnostic stream read failed");
                    break;
                }
            },

            res = &mut cancel_rx, if !cancel_seen => {
                cancel_seen = true;
                match res {
                    Ok(()) => {
                        info!("cancellation requested; killing tool process");
                        cancelled = true;
                        if let Err(err) = child.start_kill() {
                            warn!(error = %err, "failed to kill tool process on cancellation");
                        }
                        // Stop relaying: whatever is still buffered in the
                        // stream is moot, and waiting for EOF could stall on
                        // a grandchild that inherited the pipe.
                        break;
                    }
                    Err(err) => {
                        debug!(error = %err, "cancel channel closed without explicit cancellation");
                    }
                }
            }
        }
    }

    let status = child.wait().await?;
    let code = status.code().unwrap_or(-1);

    info!(
        exit_code = code,
        success = status.success(),
        cancelled,
        "tool process exited"
    );

    let outcome = if cancelled {
        Outcome::Failure(JobError::Cancelled)
    } else if status.success() {
        Outcome::Success {
            output_path: plan.output_path.clone(),
        }
    } else {
        Outcome::Failure(JobError::ToolExecutionFailed {
            code,
            tail: tail.into_iter().collect(),
        })
    };

    if !outcome.is_success() && !plan.keep_partial && !output_preexisted {
        // A failed run may have left a truncated file at the output path.
        // Never touches a file that existed before the run started.
        match tokio::fs::remove_file(&plan.output_path).await {
            Ok(()) => debug!(path = %plan.output_path.display(), "removed partial output"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(error = %err, "failed to remove partial output"),
        }
    }

    Ok(outcome)
}
