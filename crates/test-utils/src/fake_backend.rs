use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use retrack::engine::JobEvent;
use retrack::errors::{JobError, Result};
use retrack::exec::runner::RunPlan;
use retrack::exec::{CancelHandle, ToolBackend};
use retrack::job::Outcome;

/// How a scripted fake run ends.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedEnd {
    Success,
    Exit(i32),
}

/// A fake tool backend that:
/// - records every `RunPlan` it was asked to execute
/// - emits scripted diagnostic lines followed by a scripted outcome,
///   without spawning any real process.
pub struct FakeToolBackend {
    event_tx: mpsc::Sender<JobEvent>,
    plans: Arc<Mutex<Vec<RunPlan>>>,
    missing_tool: Option<String>,
    lines: Vec<String>,
    end: ScriptedEnd,
}

impl FakeToolBackend {
    pub fn new(event_tx: mpsc::Sender<JobEvent>) -> Self {
        Self {
            event_tx,
            plans: Arc::new(Mutex::new(Vec::new())),
            missing_tool: None,
            lines: Vec::new(),
            end: ScriptedEnd::Success,
        }
    }

    /// Diagnostic lines the fake run will emit, in order.
    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        self.lines = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Script a nonzero exit instead of success.
    pub fn failing_with(mut self, code: i32) -> Self {
        self.end = ScriptedEnd::Exit(code);
        self
    }

    /// Script the preflight probe to fail as tool-not-found.
    pub fn preflight_missing(mut self, tool: &str) -> Self {
        self.missing_tool = Some(tool.to_string());
        self
    }

    /// Shared handle to the recorded run plans.
    pub fn recorded_plans(&self) -> Arc<Mutex<Vec<RunPlan>>> {
        Arc::clone(&self.plans)
    }
}

impl ToolBackend for FakeToolBackend {
    fn probe(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        let tx = self.event_tx.clone();
        let missing = self.missing_tool.clone();

        Box::pin(async move {
            let event = match missing {
                Some(tool) => JobEvent::PreflightFailed {
                    error: JobError::ToolNotFound { tool },
                },
                None => JobEvent::PreflightPassed {
                    tool: PathBuf::from("/fake/bin/ffmpeg"),
                },
            };
            let _ = tx.send(event).await;
        })
    }

    fn run_job(
        &mut self,
        plan: RunPlan,
    ) -> Pin<Box<dyn Future<Output = Result<CancelHandle>> + Send + '_>> {
        let tx = self.event_tx.clone();
        let plans = Arc::clone(&self.plans);
        let lines = self.lines.clone();
        let end = self.end;

        Box::pin(async move {
            {
                let mut guard = plans.lock().unwrap();
                guard.push(plan.clone());
            }

            let (handle, _cancel_rx) = CancelHandle::pair();

            tokio::spawn(async move {
                for line in lines {
                    let _ = tx.send(JobEvent::Diagnostic { line }).await;
                }

                let outcome = match end {
                    ScriptedEnd::Success => Outcome::Success {
                        output_path: plan.output_path.clone(),
                    },
                    ScriptedEnd::Exit(code) => Outcome::Failure(
                        JobError::ToolExecutionFailed {
                            code,
                            tail: Vec::new(),
                        },
                    ),
                };
                let _ = tx.send(JobEvent::Finished { outcome }).await;
            });

            Ok(handle)
        })
    }
}
