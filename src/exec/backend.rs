// src/exec/backend.rs

//! Pluggable tool backend abstraction.
//!
//! The controller runtime talks to a `ToolBackend` instead of spawning
//! processes itself. This keeps the runtime testable: production code uses
//! [`RealToolBackend`], while tests can substitute a fake that records the
//! exact invocation and scripts diagnostics and outcomes.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};

use crate::engine::JobEvent;
use crate::errors::Result;
use crate::exec::preflight;
use crate::exec::runner::{self, RunPlan};

/// Owned cancellation token for one running job.
///
/// Spawning a job hands this back to the controller; firing it sends a
/// best-effort termination signal to the child process. The run still
/// resolves through its normal `Finished` event.
#[derive(Debug)]
pub struct CancelHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl CancelHandle {
    /// Create a handle together with the receiver the runner selects on.
    pub fn pair() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Fire the cancellation signal. Returns false when the signal was
    /// already sent or the run has already resolved.
    pub fn cancel(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// Trait abstracting how jobs reach the external tool.
pub trait ToolBackend: Send {
    /// Verify the tool is invocable. Reports the result back to the
    /// controller as a `PreflightPassed` or `PreflightFailed` event; the
    /// returned future is spawned by the runtime so the event loop stays
    /// responsive to cancellation while the probe blocks.
    fn probe(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

    /// Spawn the tool for one job and return the cancellation handle.
    ///
    /// The implementation is free to:
    /// - spawn the real OS process (production)
    /// - record the plan and emit scripted `JobEvent`s (tests)
    fn run_job(
        &mut self,
        plan: RunPlan,
    ) -> Pin<Box<dyn Future<Output = Result<CancelHandle>> + Send + '_>>;
}

/// Real tool backend used in production.
///
/// `run_job` spawns the runner task immediately; diagnostics and the final
/// outcome flow back over the event channel the backend was wired with.
pub struct RealToolBackend {
    event_tx: mpsc::Sender<JobEvent>,
    tool_path: String,
}

impl RealToolBackend {
    pub fn new(event_tx: mpsc::Sender<JobEvent>, tool_path: String) -> Self {
        Self {
            event_tx,
            tool_path,
        }
    }
}

impl ToolBackend for RealToolBackend {
    fn probe(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        let tx = self.event_tx.clone();
        let tool = self.tool_path.clone();

        Box::pin(async move {
            let event = match preflight::probe(&tool).await {
                Ok(tool) => JobEvent::PreflightPassed { tool },
                Err(error) => JobEvent::PreflightFailed { error },
            };
            let _ = tx.send(event).await;
        })
    }

    fn run_job(
        &mut self,
        plan: RunPlan,
    ) -> Pin<Box<dyn Future<Output = Result<CancelHandle>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.event_tx.clone();

        Box::pin(async move {
            let (handle, cancel_rx) = CancelHandle::pair();
            tokio::spawn(runner::run_tool(plan, tx, cancel_rx));
            Ok(handle)
        })
    }
}
